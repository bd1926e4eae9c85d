use serde::{Deserialize, Serialize};

/// Points deducted per analyzer-reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityWeights {
    pub critical: u32,
    pub major: u32,
    pub minor: u32,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            critical: 25,
            major: 10,
            minor: 3,
        }
    }
}

/// Points deducted for the best drawing format present in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatPenalties {
    pub engineering: u32,
    pub three_d: u32,
    pub image: u32,
    pub unrecognized: u32,
}

impl Default for FormatPenalties {
    fn default() -> Self {
        Self {
            engineering: 0,
            three_d: 5,
            image: 10,
            unrecognized: 15,
        }
    }
}

/// Scoring constants for automated drawing review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Starting score when the analyzer runs.
    pub baseline_score: u32,
    /// Starting score when the analyzer fails.
    pub fallback_score: u32,
    pub approval_threshold: u32,
    pub revision_threshold: u32,
    /// More critical issues than this rejects regardless of score.
    pub critical_rejection_limit: u32,
    #[serde(default)]
    pub weights: SeverityWeights,
    #[serde(default)]
    pub format_penalties: FormatPenalties,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            baseline_score: 85,
            fallback_score: 75,
            approval_threshold: 75,
            revision_threshold: 60,
            critical_rejection_limit: 2,
            weights: SeverityWeights::default(),
            format_penalties: FormatPenalties::default(),
        }
    }
}
