//! Automated compliance scoring of a submission's drawing set.

mod config;
mod formats;
mod policy;

pub use config::{EvaluationConfig, FormatPenalties, SeverityWeights};
pub use formats::FormatClass;
pub use policy::{drawing_status, manual_report_score, manual_status};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analyzer::{AnalyzerError, DrawingAnalysis, DrawingAnalyzer};
use super::domain::{
    IssueCounts, IssueRecord, Project, ProjectId, ReviewReport, ReviewStatus, Severity,
    AUTOMATED_REVIEWER,
};
use super::recommendations::automated_lines;
use policy::decide_status;

pub const DRAWINGS_REQUIRED: &str = "الرسومات الهندسية مطلوبة للمراجعة";
pub const ANALYSIS_DEGRADED: &str =
    "تعذر تحليل الرسومات وفقاً للكود المصري، تم اعتماد التحقق الأساسي";

/// Stateless evaluator that applies the scoring configuration to a project.
#[derive(Debug, Clone, Default)]
pub struct ComplianceEvaluator {
    config: EvaluationConfig,
}

impl ComplianceEvaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Run the analyzer once and score the result. Projects without drawings
    /// are rejected before the analyzer is consulted.
    pub async fn assess(
        &self,
        project: &Project,
        analyzer: &dyn DrawingAnalyzer,
    ) -> ComplianceEvaluation {
        if project.drawings.is_empty() {
            return ComplianceEvaluation::missing_drawings();
        }

        let analysis = analyzer.analyze(project).await;
        if let Err(err) = &analysis {
            tracing::warn!(
                project_id = %project.id,
                analyzer = analyzer.name(),
                error = %err,
                "drawing analysis failed; using basic verification"
            );
        }
        self.score(project, analysis)
    }

    /// Score a project given an analyzer result.
    pub fn score(
        &self,
        project: &Project,
        analysis: Result<DrawingAnalysis, AnalyzerError>,
    ) -> ComplianceEvaluation {
        if project.drawings.is_empty() {
            return ComplianceEvaluation::missing_drawings();
        }

        let format = FormatClass::classify(&project.drawings);
        let mut reasons = vec![format.note().to_string()];
        let mut deductions = format.penalty(&self.config.format_penalties);

        let (start, counts, findings, degraded) = match analysis {
            Ok(analysis) => {
                let counts = analysis.counts();
                let weights = &self.config.weights;
                deductions = deductions
                    .saturating_add(counts.critical_issues.saturating_mul(weights.critical))
                    .saturating_add(counts.major_issues.saturating_mul(weights.major))
                    .saturating_add(counts.minor_issues.saturating_mul(weights.minor));
                reasons.extend(analysis.notes);
                reasons.extend(finding_lines(&analysis.findings));
                (self.config.baseline_score, counts, analysis.findings, false)
            }
            Err(_) => {
                reasons.push(ANALYSIS_DEGRADED.to_string());
                (
                    self.config.fallback_score,
                    IssueCounts::default(),
                    Vec::new(),
                    true,
                )
            }
        };

        let score = start.saturating_sub(deductions).min(100) as u8;
        let (status, verdict) = decide_status(score, counts.critical_issues, &self.config);
        reasons.push(verdict);

        ComplianceEvaluation {
            score,
            status,
            reasons,
            counts,
            format: Some(format),
            degraded,
            findings,
        }
    }
}

fn finding_heading(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "مخالفات حرجة للكود المصري",
        Severity::Major => "مخالفات كبيرة للكود المصري",
        Severity::Minor => "مخالفات صغيرة للكود المصري",
    }
}

/// One line per severity that has non-compliant findings, critical first.
fn finding_lines(findings: &[IssueRecord]) -> Vec<String> {
    [Severity::Critical, Severity::Major, Severity::Minor]
        .into_iter()
        .filter_map(|severity| {
            let titles: Vec<&str> = findings
                .iter()
                .filter(|finding| finding.is_non_compliant() && finding.severity == severity)
                .map(|finding| {
                    if finding.notes.trim().is_empty() {
                        finding.rule_id.as_str()
                    } else {
                        finding.notes.as_str()
                    }
                })
                .collect();
            (!titles.is_empty())
                .then(|| format!("{}: {}", finding_heading(severity), titles.join(", ")))
        })
        .collect()
}

/// Result of one automated evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceEvaluation {
    pub score: u8,
    pub status: ReviewStatus,
    pub reasons: Vec<String>,
    pub counts: IssueCounts,
    /// `None` when there were no drawings to classify.
    pub format: Option<FormatClass>,
    /// Set when the analyzer failed and the fallback score was used.
    pub degraded: bool,
    #[serde(default)]
    pub findings: Vec<IssueRecord>,
}

impl ComplianceEvaluation {
    fn missing_drawings() -> Self {
        Self {
            score: 0,
            status: ReviewStatus::Rejected,
            reasons: vec![DRAWINGS_REQUIRED.to_string()],
            counts: IssueCounts::new(1, 0, 0),
            format: None,
            degraded: false,
            findings: Vec::new(),
        }
    }

    /// Report lines: a severity summary when issues exist, then the reasons.
    pub fn recommendations(&self) -> Vec<String> {
        automated_lines(&self.counts, &self.reasons)
    }

    pub fn to_report(
        &self,
        id: String,
        project_id: ProjectId,
        generated_at: DateTime<Utc>,
    ) -> ReviewReport {
        ReviewReport {
            id,
            project_id,
            overall_status: self.status,
            compliance_score: self.score,
            counts: self.counts,
            recommendations: self.recommendations(),
            generated_at,
            reviewer_id: AUTOMATED_REVIEWER.to_string(),
            reasons: self.reasons.clone(),
            findings: self.findings.clone(),
        }
    }
}
