use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

const ZERO_WIDTH: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}'];
const EDGE_DASHES: [char; 3] = ['-', '\u{2013}', '\u{2014}'];

/// Canonical form of a recommendation line: NFC, no zero-width characters,
/// single spaces, and no leading or trailing dashes or whitespace.
pub fn sanitize(raw: &str) -> String {
    let normalized: String = raw.nfc().filter(|ch| !ZERO_WIDTH.contains(ch)).collect();
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|ch: char| ch.is_whitespace() || EDGE_DASHES.contains(&ch))
        .to_string()
}

/// Sanitize every line and keep first occurrences only, dropping empties.
pub fn dedup_sanitized<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for line in lines {
        let cleaned = sanitize(line.as_ref());
        if cleaned.is_empty() || !seen.insert(cleaned.clone()) {
            continue;
        }
        unique.push(cleaned);
    }
    unique
}
