//! Fire-safety compliance review of building project submissions.
//!
//! Applicants submit building metadata and drawing file metadata. The
//! [`ComplianceEvaluator`] turns that into a 0-100 score and a tri-state
//! status; [`recommendations`] produces the deduplicated advice shown on the
//! review report. Drawing "analysis" is simulated from file names, types and
//! sizes; no drawing content is ever read.

pub mod analyzer;
pub mod catalog;
pub mod domain;
pub mod evaluation;
pub mod license;
pub mod notifications;
pub mod recommendations;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use analyzer::{
    AnalyzerError, DrawingAnalysis, DrawingAnalyzer, ExternalAnalysisCache,
    KeywordHeuristicAnalyzer, NoopAnalyzer, SimulatedCodeAnalyzer,
};
pub use catalog::{CatalogError, FireCodeRule, RuleCatalog};
pub use domain::{
    ApplicantProjectStats, BuildingProfile, ComplianceState, Drawing, DrawingId, DrawingStatus,
    DrawingUpload, IssueCounts, IssueRecord, License, LicenseStatus, Project, ProjectId,
    ProjectStatus, ProjectStatusView, ProjectSubmission, ProjectUpdate, ReviewReport,
    ReviewStatus, Severity, SiteLocation, UserId,
};
pub use evaluation::{ComplianceEvaluation, ComplianceEvaluator, EvaluationConfig, FormatClass};
pub use license::{LicenseError, LicenseIssuer, SequentialLicenseIssuer};
pub use notifications::{
    Notification, NotificationCenter, NotificationDraft, NotificationError, NotificationKind,
    NotificationSink, ADMIN_USER_ID,
};
pub use repository::{ProjectRepository, RepositoryError};
pub use router::review_router;
pub use service::{ReviewOutcome, ReviewService, ReviewServiceError};
pub use store::{InMemoryProjectStore, JsonFileStore};
