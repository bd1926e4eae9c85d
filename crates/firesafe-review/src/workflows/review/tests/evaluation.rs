use super::common::*;
use crate::workflows::review::analyzer::{AnalyzerError, DrawingAnalysis};
use crate::workflows::review::domain::{
    ComplianceState, DrawingStatus, DrawingUpload, IssueCounts, IssueRecord, ReviewStatus,
    Severity,
};
use crate::workflows::review::evaluation::{
    drawing_status, manual_report_score, manual_status, ComplianceEvaluator, EvaluationConfig,
    FormatClass, SeverityWeights, ANALYSIS_DEGRADED, DRAWINGS_REQUIRED,
};

fn evaluator() -> ComplianceEvaluator {
    ComplianceEvaluator::new(EvaluationConfig::default())
}

fn pdf() -> Vec<DrawingUpload> {
    vec![upload("fire_plan.pdf", "application/pdf")]
}

#[tokio::test]
async fn zero_drawings_reject_without_consulting_analyzer() {
    let analyzer = FixedAnalyzer::new(analysis(0, 0, 0));
    let project = project_with(&[]);

    let evaluation = evaluator().assess(&project, &analyzer).await;

    assert_eq!(evaluation.score, 0);
    assert_eq!(evaluation.status, ReviewStatus::Rejected);
    assert_eq!(evaluation.reasons, vec![DRAWINGS_REQUIRED.to_string()]);
    assert_eq!(evaluation.counts, IssueCounts::new(1, 0, 0));
    assert_eq!(evaluation.format, None);
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test]
async fn engineering_pdf_with_clean_analysis_scores_baseline() {
    let analyzer = FixedAnalyzer::new(analysis(0, 0, 0));
    let project = project_with(&pdf());

    let evaluation = evaluator().assess(&project, &analyzer).await;

    assert_eq!(evaluation.score, 85);
    assert_eq!(evaluation.status, ReviewStatus::Approved);
    assert_eq!(evaluation.format, Some(FormatClass::Engineering));
    assert_eq!(
        evaluation.reasons.first().map(String::as_str),
        Some(FormatClass::Engineering.note())
    );
    assert_eq!(analyzer.calls(), 1);
    assert!(!evaluation.degraded);
}

#[test]
fn image_only_submission_lands_on_approval_boundary() {
    let project = project_with(&[upload("photo.jpg", "image/jpeg")]);

    let evaluation = evaluator().score(&project, Ok(analysis(0, 0, 0)));

    assert_eq!(evaluation.score, 75);
    assert_eq!(evaluation.status, ReviewStatus::Approved);
    assert_eq!(evaluation.format, Some(FormatClass::Image));
}

#[test]
fn weaker_formats_carry_their_deductions() {
    let three_d = evaluator().score(
        &project_with(&[upload("massing.skp", "model/vnd.sketchup.skp")]),
        Ok(analysis(0, 0, 0)),
    );
    assert_eq!(three_d.score, 80);
    assert_eq!(three_d.status, ReviewStatus::Approved);

    let unknown = evaluator().score(
        &project_with(&[upload("notes.txt", "text/plain")]),
        Ok(analysis(0, 0, 0)),
    );
    assert_eq!(unknown.score, 70);
    assert_eq!(unknown.status, ReviewStatus::NeedsRevision);
    assert_eq!(unknown.format, Some(FormatClass::Unrecognized));
}

#[tokio::test]
async fn analyzer_failure_falls_back_to_basic_verification() {
    let project = project_with(&pdf());

    let evaluation = evaluator().assess(&project, &FailingAnalyzer).await;

    assert_eq!(evaluation.score, 75);
    assert_eq!(evaluation.status, ReviewStatus::Approved);
    assert!(evaluation.degraded);
    assert!(evaluation.reasons.iter().any(|reason| reason == ANALYSIS_DEGRADED));
    assert_eq!(evaluation.counts, IssueCounts::default());
}

#[test]
fn analyzer_failure_keeps_format_deduction() {
    let project = project_with(&[upload("photo.jpg", "image/jpeg")]);
    let failure = Err(AnalyzerError::Unavailable("offline".to_string()));

    let evaluation = evaluator().score(&project, failure);

    assert_eq!(evaluation.score, 65);
    assert_eq!(evaluation.status, ReviewStatus::NeedsRevision);
}

#[test]
fn more_than_two_critical_issues_reject_regardless_of_score() {
    let project = project_with(&pdf());

    let three = evaluator().score(&project, Ok(analysis(3, 0, 0)));
    assert_eq!(three.status, ReviewStatus::Rejected);
    assert_eq!(three.score, 10);
    assert!(three
        .reasons
        .last()
        .expect("verdict line")
        .contains("3 مخالفة حرجة"));

    let generous = EvaluationConfig {
        baseline_score: 100,
        weights: SeverityWeights {
            critical: 0,
            major: 0,
            minor: 0,
        },
        ..EvaluationConfig::default()
    };
    let high_score = ComplianceEvaluator::new(generous).score(&project, Ok(analysis(3, 0, 0)));
    assert_eq!(high_score.score, 100);
    assert_eq!(high_score.status, ReviewStatus::Rejected);
}

#[test]
fn low_scores_ask_for_revision_never_rejection() {
    let project = project_with(&pdf());

    let two_critical = evaluator().score(&project, Ok(analysis(2, 0, 0)));
    assert_eq!(two_critical.score, 35);
    assert_eq!(two_critical.status, ReviewStatus::NeedsRevision);

    let majors = evaluator().score(&project, Ok(analysis(0, 3, 0)));
    assert_eq!(majors.score, 55);
    assert_eq!(majors.status, ReviewStatus::NeedsRevision);
}

#[test]
fn status_thresholds_are_monotonic() {
    let project = project_with(&pdf());
    for minor in 0..=30 {
        let evaluation = evaluator().score(&project, Ok(analysis(0, 0, minor)));
        let expected_score = 85u32.saturating_sub(minor * 3) as u8;
        assert_eq!(evaluation.score, expected_score, "minor = {minor}");

        let expected = if expected_score >= 75 {
            ReviewStatus::Approved
        } else {
            ReviewStatus::NeedsRevision
        };
        assert_eq!(evaluation.status, expected, "score = {expected_score}");
    }
}

#[test]
fn score_is_clamped_for_extreme_counts() {
    let project = project_with(&[upload("scan", "")]);
    for counts in [(0, 0, 1_000), (2, 500, 500), (u32::MAX, u32::MAX, u32::MAX)] {
        let evaluation = evaluator().score(&project, Ok(analysis(counts.0, counts.1, counts.2)));
        assert_eq!(evaluation.score, 0);
        assert!(evaluation.recommendations()[0].starts_with("ملخص المخالفات"));
    }
    assert_eq!(IssueCounts::new(u32::MAX, 1, 0).total(), u32::MAX);

    let lenient = EvaluationConfig {
        baseline_score: 250,
        ..EvaluationConfig::default()
    };
    let evaluation =
        ComplianceEvaluator::new(lenient).score(&project_with(&pdf()), Ok(analysis(0, 0, 0)));
    assert_eq!(evaluation.score, 100);
}

#[test]
fn analyzer_notes_follow_the_format_note() {
    let project = project_with(&pdf());
    let result = DrawingAnalysis {
        major: 1,
        notes: vec!["لا يوجد مخطط معماري أساسي".to_string()],
        ..DrawingAnalysis::default()
    };

    let evaluation = evaluator().score(&project, Ok(result));

    assert_eq!(evaluation.score, 75);
    assert_eq!(
        &evaluation.reasons[..2],
        &[
            FormatClass::Engineering.note().to_string(),
            "لا يوجد مخطط معماري أساسي".to_string()
        ]
    );
}

#[test]
fn report_recommendations_lead_with_summary_when_issues_exist() {
    let project = project_with(&pdf());
    let evaluation = evaluator().score(&project, Ok(analysis(1, 1, 0)));

    let lines = evaluation.recommendations();
    assert_eq!(lines[0], "ملخص المخالفات: حرجة 1، كبيرة 1، صغيرة 0");
    assert_eq!(&lines[1..], evaluation.reasons.as_slice());

    let clean = evaluator().score(&project, Ok(analysis(0, 0, 0)));
    assert_eq!(clean.recommendations(), clean.reasons);
}

#[test]
fn findings_are_listed_by_severity_after_the_notes() {
    let project = project_with(&pdf());
    let finding = |rule: &str, severity: Severity, notes: &str| {
        IssueRecord::non_compliant(rule, severity, notes, None)
    };
    let result = DrawingAnalysis {
        critical: 2,
        minor: 1,
        notes: vec!["تم تحليل المشروع: برج القاهرة".to_string()],
        findings: vec![
            finding("rule-8-1-1", Severity::Minor, "لافتات الخروج غير مضاءة"),
            finding("rule-3-1-1", Severity::Critical, "المسافة بين المباني أقل من 6 أمتار"),
            finding("rule-4-1-1", Severity::Critical, ""),
        ],
        ..DrawingAnalysis::default()
    };

    let evaluation = evaluator().score(&project, Ok(result));

    assert_eq!(
        &evaluation.reasons[1..4],
        &[
            "تم تحليل المشروع: برج القاهرة".to_string(),
            "مخالفات حرجة للكود المصري: المسافة بين المباني أقل من 6 أمتار, rule-4-1-1"
                .to_string(),
            "مخالفات صغيرة للكود المصري: لافتات الخروج غير مضاءة".to_string(),
        ]
    );
    assert!(!evaluation
        .reasons
        .iter()
        .any(|line| line.starts_with("مخالفات كبيرة")));
    assert_eq!(evaluation.findings.len(), 3);

    let report = evaluation.to_report(
        "report-1".to_string(),
        project.id.clone(),
        chrono::Utc::now(),
    );
    assert_eq!(report.reasons, evaluation.reasons);
    assert_eq!(report.findings, evaluation.findings);
    assert!(report.is_automated());
}

fn record(severity: Severity, status: ComplianceState) -> IssueRecord {
    IssueRecord {
        rule_id: "rule-010".to_string(),
        status,
        notes: String::new(),
        severity,
        suggested_fix: None,
    }
}

#[test]
fn manual_report_score_and_status() {
    assert_eq!(manual_report_score(&IssueCounts::default()), 100);
    assert_eq!(manual_report_score(&IssueCounts::new(1, 1, 1)), 65);
    assert_eq!(manual_report_score(&IssueCounts::new(4, 3, 0)), 0);

    assert_eq!(manual_status(&IssueCounts::new(1, 0, 0)), ReviewStatus::Rejected);
    assert_eq!(manual_status(&IssueCounts::new(0, 2, 5)), ReviewStatus::NeedsRevision);
    assert_eq!(manual_status(&IssueCounts::new(0, 0, 5)), ReviewStatus::Approved);
}

#[test]
fn drawing_status_ignores_compliant_records() {
    let compliant_critical = vec![record(Severity::Critical, ComplianceState::Compliant)];
    assert_eq!(drawing_status(&compliant_critical), DrawingStatus::Approved);

    let major = vec![
        record(Severity::Minor, ComplianceState::NonCompliant),
        record(Severity::Major, ComplianceState::NonCompliant),
    ];
    assert_eq!(drawing_status(&major), DrawingStatus::NeedsRevision);

    let critical = vec![
        record(Severity::Major, ComplianceState::NonCompliant),
        record(Severity::Critical, ComplianceState::NonCompliant),
    ];
    assert_eq!(drawing_status(&critical), DrawingStatus::Rejected);
}
