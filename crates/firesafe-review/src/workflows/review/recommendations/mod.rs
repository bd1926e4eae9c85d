//! Ranked, deduplicated recommendation text derived from review issue records.

mod sanitize;

pub use sanitize::{dedup_sanitized, sanitize};

use std::iter;

use super::domain::{IssueCounts, IssueRecord, ReviewStatus, Severity};

/// Maximum number of lines returned by [`generate`].
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Returned verbatim when no issue is non-compliant.
pub const POSITIVE_RECOMMENDATIONS: [&str; 2] = [
    "لا توجد مخالفات للكود المصري في الرسومات المرفوعة",
    "تأكد من تحديث الرسومات وفقًا لأحدث نسخة من الكود المصري رقم 126 لسنة 2021",
];

/// Header line listing non-compliant counts by severity.
pub fn summary_line(counts: &IssueCounts) -> String {
    format!(
        "ملخص المخالفات: حرجة {}، كبيرة {}، صغيرة {}",
        counts.critical_issues, counts.major_issues, counts.minor_issues
    )
}

/// Lines of an automated report: the severity summary when any issue was
/// found, then the evaluator's reasons in order.
pub fn automated_lines(counts: &IssueCounts, reasons: &[String]) -> Vec<String> {
    let summary = (counts.total() > 0).then(|| summary_line(counts));
    dedup_sanitized(summary.into_iter().chain(reasons.iter().cloned()))
}

fn action_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "إجراء فوري (حرج)",
        Severity::Major => "إجراء مطلوب (كبير)",
        Severity::Minor => "تحسين (صغير)",
    }
}

fn generic_action(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "يرجى معالجة المخالفات الحرجة فورًا وفقًا لاشتراطات الكود المصري",
        Severity::Major => "يرجى تنفيذ التعديلات المطلوبة لضمان المطابقة مع الكود المصري",
        Severity::Minor => "يفضل إجراء تحسينات طفيفة لتعزيز المطابقة",
    }
}

fn action_line(issue: &IssueRecord) -> String {
    let fix = issue
        .suggested_fix
        .as_deref()
        .map(sanitize)
        .unwrap_or_default();
    if fix.is_empty() {
        generic_action(issue.severity).to_string()
    } else {
        format!("{}: {}", action_label(issue.severity), fix)
    }
}

/// Build the recommendation list for a set of issue records.
///
/// Pure and deterministic: the same records always yield the same lines.
pub fn generate(issues: &[IssueRecord]) -> Vec<String> {
    let mut non_compliant: Vec<&IssueRecord> =
        issues.iter().filter(|issue| issue.is_non_compliant()).collect();

    if non_compliant.is_empty() {
        return POSITIVE_RECOMMENDATIONS
            .iter()
            .map(|line| line.to_string())
            .collect();
    }

    let counts = IssueCounts::from_issues(non_compliant.iter().copied());
    // Vec::sort_by is stable, so equal severities keep submission order.
    non_compliant.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));

    let actions = non_compliant.into_iter().map(action_line);
    let mut lines = dedup_sanitized(iter::once(summary_line(&counts)).chain(actions));
    lines.truncate(MAX_RECOMMENDATIONS);
    lines
}

/// [`generate`] preceded by lines explaining why the report has its status.
pub fn generate_with_context(
    issues: &[IssueRecord],
    overall_status: ReviewStatus,
    counts: &IssueCounts,
) -> Vec<String> {
    let mut header = Vec::with_capacity(3);
    match overall_status {
        ReviewStatus::Rejected => header.push(format!(
            "سبب الرفض: وجود {} مخالفة حرجة تتطلب معالجة فورية وفق الكود المصري",
            counts.critical_issues
        )),
        ReviewStatus::NeedsRevision => header.push(format!(
            "سبب طلب التعديل: وجود {} مخالفة كبيرة و{} مخالفة صغيرة تحتاج تحسين",
            counts.major_issues, counts.minor_issues
        )),
        ReviewStatus::Approved => {
            header.push("سبب الموافقة: لا توجد مخالفات حرجة أو كبيرة في الرسومات".to_string())
        }
    }

    if counts.critical_issues > 0 {
        header.push("مرفوض بسبب: مخالفات حرجة يجب إزالتها قبل إعادة التقديم".to_string());
    }
    if counts.major_issues > 0 || counts.minor_issues > 0 {
        header.push(
            "يتطلب تعديل: معالجة المخالفات الكبيرة والتحسينات الصغيرة لضمان المطابقة".to_string(),
        );
    }

    dedup_sanitized(header.into_iter().chain(generate(issues)))
}
