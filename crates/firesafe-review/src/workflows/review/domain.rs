use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

/// Identifier wrapper for portal users (applicants and administrators).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawingId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DrawingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Building metadata declared by the applicant at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingProfile {
    /// Building use classification as listed in the rule catalog (e.g. `سكني`, `تجاري`).
    pub building_type: String,
    /// Gross floor area in square metres.
    pub area: f64,
    pub floors: u16,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub basement_floors: Option<u16>,
    #[serde(default)]
    pub parking_spaces: Option<u32>,
    #[serde(default)]
    pub total_occupancy: Option<u32>,
    #[serde(default)]
    pub occupancy_type: Option<String>,
    #[serde(default)]
    pub construction_type: Option<String>,
}

impl BuildingProfile {
    /// True when either the building type or the declared occupancy mentions `needle`.
    pub fn is_use(&self, needle: &str) -> bool {
        self.building_type.contains(needle)
            || self
                .occupancy_type
                .as_deref()
                .map(|occupancy| occupancy.contains(needle))
                .unwrap_or(false)
    }
}

/// Site location captured from the submission map picker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteLocation {
    pub location: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// File metadata for an uploaded drawing. No drawing content is ever inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingUpload {
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    NeedsRevision,
}

impl DrawingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DrawingStatus::Pending => "pending",
            DrawingStatus::UnderReview => "under_review",
            DrawingStatus::Approved => "approved",
            DrawingStatus::Rejected => "rejected",
            DrawingStatus::NeedsRevision => "needs_revision",
        }
    }
}

/// Drawing record owned by exactly one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub id: DrawingId,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub status: DrawingStatus,
    #[serde(default)]
    pub review_results: Vec<IssueRecord>,
}

/// Incoming submission before the portal assigns identity and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSubmission {
    pub applicant_id: UserId,
    pub project_name: String,
    pub building: BuildingProfile,
    #[serde(default)]
    pub location: SiteLocation,
    #[serde(default)]
    pub drawings: Vec<DrawingUpload>,
}

/// Partial edit applied to an existing project before re-evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub building: Option<BuildingProfile>,
    #[serde(default)]
    pub location: Option<SiteLocation>,
}

/// Lifecycle status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    NeedsRevision,
}

impl ProjectStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Submitted => "submitted",
            ProjectStatus::UnderReview => "under_review",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Rejected => "rejected",
            ProjectStatus::NeedsRevision => "needs_revision",
        }
    }
}

/// Tri-state outcome of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    Rejected,
    NeedsRevision,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::NeedsRevision => "needs_revision",
        }
    }
}

impl From<ReviewStatus> for ProjectStatus {
    fn from(value: ReviewStatus) -> Self {
        match value {
            ReviewStatus::Approved => ProjectStatus::Approved,
            ReviewStatus::Rejected => ProjectStatus::Rejected,
            ReviewStatus::NeedsRevision => ProjectStatus::NeedsRevision,
        }
    }
}

impl From<ReviewStatus> for DrawingStatus {
    fn from(value: ReviewStatus) -> Self {
        match value {
            ReviewStatus::Approved => DrawingStatus::Approved,
            ReviewStatus::Rejected => DrawingStatus::Rejected,
            ReviewStatus::NeedsRevision => DrawingStatus::NeedsRevision,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

impl Severity {
    /// Sort rank; higher is more severe.
    pub const fn rank(self) -> u8 {
        match self {
            Severity::Critical => 3,
            Severity::Major => 2,
            Severity::Minor => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceState {
    Compliant,
    NonCompliant,
    NeedsAttention,
}

/// Result of checking one rule against one drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub rule_id: String,
    pub status: ComplianceState,
    #[serde(default)]
    pub notes: String,
    pub severity: Severity,
    #[serde(default)]
    pub suggested_fix: Option<String>,
}

impl IssueRecord {
    pub fn non_compliant(
        rule_id: impl Into<String>,
        severity: Severity,
        notes: impl Into<String>,
        suggested_fix: Option<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            status: ComplianceState::NonCompliant,
            notes: notes.into(),
            severity,
            suggested_fix,
        }
    }

    pub fn is_non_compliant(&self) -> bool {
        self.status == ComplianceState::NonCompliant
    }
}

/// Issue tallies by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueCounts {
    pub critical_issues: u32,
    pub major_issues: u32,
    pub minor_issues: u32,
}

impl IssueCounts {
    pub fn new(critical_issues: u32, major_issues: u32, minor_issues: u32) -> Self {
        Self {
            critical_issues,
            major_issues,
            minor_issues,
        }
    }

    /// Count the non-compliant records only.
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a IssueRecord>) -> Self {
        let mut counts = Self::default();
        for issue in issues.into_iter().filter(|issue| issue.is_non_compliant()) {
            match issue.severity {
                Severity::Critical => counts.critical_issues += 1,
                Severity::Major => counts.major_issues += 1,
                Severity::Minor => counts.minor_issues += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u32 {
        self.critical_issues
            .saturating_add(self.major_issues)
            .saturating_add(self.minor_issues)
    }
}

/// Identity recorded on reports produced without a human reviewer.
pub const AUTOMATED_REVIEWER: &str = "auto";

/// Persisted output of one evaluation run. Replaced, never versioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub id: String,
    pub project_id: ProjectId,
    pub overall_status: ReviewStatus,
    pub compliance_score: u8,
    #[serde(flatten)]
    pub counts: IssueCounts,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub reviewer_id: String,
    /// Evaluator reasons behind an automated report. Empty for manual reports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    /// Analyzer findings behind an automated report.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<IssueRecord>,
}

impl ReviewReport {
    pub fn is_automated(&self) -> bool {
        self.reviewer_id == AUTOMATED_REVIEWER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    Active,
    Expired,
    Revoked,
}

/// Operating license granted to an approved project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    pub project_id: ProjectId,
    pub license_number: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: LicenseStatus,
    pub document_path: String,
}

/// One applicant submission and everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub applicant_id: UserId,
    pub project_name: String,
    pub building: BuildingProfile,
    pub location: SiteLocation,
    pub status: ProjectStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub drawings: Vec<Drawing>,
    #[serde(default)]
    pub review_report: Option<ReviewReport>,
    #[serde(default)]
    pub license: Option<License>,
    /// Optimistic-concurrency token, bumped by the repository on every update.
    #[serde(default)]
    pub revision: u64,
}

impl Project {
    /// All per-drawing review records in drawing order.
    pub fn review_results(&self) -> Vec<IssueRecord> {
        self.drawings
            .iter()
            .flat_map(|drawing| drawing.review_results.iter().cloned())
            .collect()
    }

    pub fn drawing_mut(&mut self, id: &DrawingId) -> Option<&mut Drawing> {
        self.drawings.iter_mut().find(|drawing| &drawing.id == id)
    }

    pub fn status_view(&self) -> ProjectStatusView {
        ProjectStatusView {
            project_id: self.id.clone(),
            project_name: self.project_name.clone(),
            status: self.status.label(),
            drawings: self.drawings.len(),
            compliance_score: self
                .review_report
                .as_ref()
                .map(|report| report.compliance_score),
            recommendations: self
                .review_report
                .as_ref()
                .map(|report| report.recommendations.clone())
                .unwrap_or_default(),
            license_number: self
                .license
                .as_ref()
                .map(|license| license.license_number.clone()),
        }
    }
}

/// Sanitized representation of a project's exposed review state.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectStatusView {
    pub project_id: ProjectId,
    pub project_name: String,
    pub status: &'static str,
    pub drawings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_score: Option<u8>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
}

/// Per-applicant dashboard tallies. Drafts count as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ApplicantProjectStats {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub under_review: usize,
    pub rejected: usize,
    pub needs_revision: usize,
}

impl ApplicantProjectStats {
    pub fn tally<'a>(projects: impl IntoIterator<Item = &'a Project>) -> Self {
        let mut stats = Self::default();
        for project in projects {
            stats.total += 1;
            match project.status {
                ProjectStatus::Approved => stats.approved += 1,
                ProjectStatus::Submitted | ProjectStatus::Draft => stats.pending += 1,
                ProjectStatus::UnderReview => stats.under_review += 1,
                ProjectStatus::Rejected => stats.rejected += 1,
                ProjectStatus::NeedsRevision => stats.needs_revision += 1,
            }
        }
        stats
    }
}
