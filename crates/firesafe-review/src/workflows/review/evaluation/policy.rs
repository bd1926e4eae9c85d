use super::super::domain::{DrawingStatus, IssueCounts, IssueRecord, ReviewStatus, Severity};
use super::config::EvaluationConfig;

/// Status of an automated evaluation plus the line explaining it.
///
/// Once drawings exist, only the critical-issue count can reject; a low score
/// alone asks for revision.
pub(crate) fn decide_status(
    score: u8,
    critical_issues: u32,
    config: &EvaluationConfig,
) -> (ReviewStatus, String) {
    let score = u32::from(score);
    if critical_issues > config.critical_rejection_limit {
        return (
            ReviewStatus::Rejected,
            format!(
                "المشروع يحتاج مراجعة شاملة بسبب {critical_issues} مخالفة حرجة للكود المصري"
            ),
        );
    }
    if score >= config.approval_threshold {
        return (
            ReviewStatus::Approved,
            "الرسومات الهندسية مطابقة للكود المصري للحريق".to_string(),
        );
    }
    if score >= config.revision_threshold {
        return (
            ReviewStatus::NeedsRevision,
            "تحتاج الرسومات إلى مراجعة إضافية لضمان الامتثال الكامل للكود المصري".to_string(),
        );
    }
    (
        ReviewStatus::NeedsRevision,
        "تحتاج الرسومات إلى تحسينات لضمان الامتثال للكود المصري".to_string(),
    )
}

/// Score for a reviewer-authored report: 100 when clean, otherwise
/// `100 - 20c - 10m - 5n` floored at zero.
pub fn manual_report_score(counts: &IssueCounts) -> u8 {
    if counts.total() == 0 {
        return 100;
    }
    let deductions = counts
        .critical_issues
        .saturating_mul(20)
        .saturating_add(counts.major_issues.saturating_mul(10))
        .saturating_add(counts.minor_issues.saturating_mul(5));
    100u32.saturating_sub(deductions) as u8
}

pub fn manual_status(counts: &IssueCounts) -> ReviewStatus {
    if counts.critical_issues > 0 {
        ReviewStatus::Rejected
    } else if counts.major_issues > 0 {
        ReviewStatus::NeedsRevision
    } else {
        ReviewStatus::Approved
    }
}

/// Status a drawing takes after a manual review of its issue records.
pub fn drawing_status(issues: &[IssueRecord]) -> DrawingStatus {
    let any = |severity: Severity| {
        issues
            .iter()
            .any(|issue| issue.is_non_compliant() && issue.severity == severity)
    };
    if any(Severity::Critical) {
        DrawingStatus::Rejected
    } else if any(Severity::Major) {
        DrawingStatus::NeedsRevision
    } else {
        DrawingStatus::Approved
    }
}
