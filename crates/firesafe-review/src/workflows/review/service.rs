use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::analyzer::{DrawingAnalyzer, NoopAnalyzer};
use super::catalog::RuleCatalog;
use super::domain::{
    ApplicantProjectStats, BuildingProfile, Drawing, DrawingId, DrawingStatus, DrawingUpload,
    IssueCounts, IssueRecord, License, Project, ProjectId, ProjectStatus, ProjectSubmission,
    ProjectUpdate, ReviewReport, ReviewStatus, UserId,
};
use super::evaluation::{
    drawing_status, manual_report_score, manual_status, ComplianceEvaluation,
    ComplianceEvaluator, EvaluationConfig,
};
use super::license::{LicenseError, LicenseIssuer, SequentialLicenseIssuer};
use super::notifications::{NotificationDraft, NotificationKind, NotificationSink};
use super::recommendations::{automated_lines, generate_with_context};
use super::repository::{ProjectRepository, RepositoryError};

/// Service composing the project repository, drawing analyzer, evaluator,
/// license issuer and notification sink.
pub struct ReviewService<R, N> {
    repository: Arc<R>,
    notifications: Arc<N>,
    analyzer: Arc<dyn DrawingAnalyzer>,
    licenses: Arc<dyn LicenseIssuer>,
    catalog: Arc<RuleCatalog>,
    evaluator: Arc<ComplianceEvaluator>,
    sequence: AtomicU64,
}

/// What one automated evaluation decided and what it changed.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub project_id: ProjectId,
    pub score: u8,
    pub status: ReviewStatus,
    pub reasons: Vec<String>,
    pub report: ReviewReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// Set when the new state was computed but could not be stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_warning: Option<String>,
    pub degraded: bool,
}

fn numeric_suffix(id: &str) -> u64 {
    id.rsplit_once('-')
        .and_then(|(_, digits)| digits.parse::<u64>().ok())
        .unwrap_or(0)
}

/// Highest numeric suffix among ids already handed out, so a reopened store
/// never sees a reused id.
fn highest_issued(projects: &[Project]) -> u64 {
    projects
        .iter()
        .flat_map(|project| {
            let drawings = project
                .drawings
                .iter()
                .map(|drawing| numeric_suffix(&drawing.id.0));
            let report = project
                .review_report
                .iter()
                .map(|report| numeric_suffix(&report.id));
            std::iter::once(numeric_suffix(&project.id.0))
                .chain(drawings)
                .chain(report)
        })
        .max()
        .unwrap_or(0)
}

fn highest_license(projects: &[Project]) -> u64 {
    projects
        .iter()
        .filter_map(|project| project.license.as_ref())
        .map(|license| numeric_suffix(&license.id))
        .max()
        .unwrap_or(0)
}

fn notification_kind(status: ReviewStatus) -> NotificationKind {
    match status {
        ReviewStatus::Approved => NotificationKind::Success,
        ReviewStatus::Rejected => NotificationKind::Error,
        ReviewStatus::NeedsRevision => NotificationKind::Warning,
    }
}

fn decision_phrase(status: ReviewStatus) -> &'static str {
    match status {
        ReviewStatus::Approved => "الموافقة على",
        ReviewStatus::Rejected => "رفض",
        ReviewStatus::NeedsRevision => "طلب مراجعة",
    }
}

/// Copy a computed review onto `project`.
fn apply_review(
    project: &mut Project,
    report: &ReviewReport,
    license: Option<&License>,
    reviewed_at: DateTime<Utc>,
) {
    project.status = report.overall_status.into();
    project.review_report = Some(report.clone());
    project.reviewed_at = Some(reviewed_at);
    if let Some(license) = license {
        project.license = Some(license.clone());
        project.approved_at = Some(license.issued_at);
    }
}

impl<R, N> ReviewService<R, N>
where
    R: ProjectRepository + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifications: Arc<N>,
        catalog: Arc<RuleCatalog>,
        config: EvaluationConfig,
    ) -> Self {
        let (issued, licensed) = repository
            .all()
            .map(|projects| (highest_issued(&projects), highest_license(&projects)))
            .unwrap_or((0, 0));

        Self {
            repository,
            notifications,
            analyzer: Arc::new(NoopAnalyzer),
            licenses: Arc::new(SequentialLicenseIssuer::starting_at(licensed + 1)),
            catalog,
            evaluator: Arc::new(ComplianceEvaluator::new(config)),
            sequence: AtomicU64::new(issued + 1),
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn DrawingAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_license_issuer(mut self, licenses: Arc<dyn LicenseIssuer>) -> Self {
        self.licenses = licenses;
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn analyzer_name(&self) -> &'static str {
        self.analyzer.name()
    }

    fn next_id(&self, prefix: &str) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}-{id:06}")
    }

    fn drawing_from(&self, upload: DrawingUpload, uploaded_at: DateTime<Utc>) -> Drawing {
        Drawing {
            id: DrawingId(self.next_id("drw")),
            file_name: upload.file_name,
            file_type: upload.file_type,
            file_size: upload.file_size,
            uploaded_at,
            status: DrawingStatus::Pending,
            review_results: Vec::new(),
        }
    }

    fn notify(&self, draft: NotificationDraft) {
        let user_id = draft.user_id.clone();
        if let Err(err) = self.notifications.notify(draft) {
            tracing::warn!(user_id = %user_id, error = %err, "notification delivery failed");
        }
    }

    fn load(&self, project_id: &ProjectId) -> Result<Project, ReviewServiceError> {
        self.repository
            .fetch(project_id)?
            .ok_or(ReviewServiceError::Repository(RepositoryError::NotFound))
    }

    /// Register a new submission with status `submitted`.
    pub fn submit(&self, submission: ProjectSubmission) -> Result<Project, ReviewServiceError> {
        validate_submission(&submission)?;

        let now = Utc::now();
        let drawings = submission
            .drawings
            .into_iter()
            .map(|upload| self.drawing_from(upload, now))
            .collect();

        let project = Project {
            id: ProjectId(self.next_id("prj")),
            applicant_id: submission.applicant_id,
            project_name: submission.project_name.trim().to_string(),
            building: submission.building,
            location: submission.location,
            status: ProjectStatus::Submitted,
            submitted_at: now,
            reviewed_at: None,
            approved_at: None,
            drawings,
            review_report: None,
            license: None,
            revision: 0,
        };

        let stored = self.repository.insert(project)?;
        tracing::info!(
            project_id = %stored.id,
            applicant_id = %stored.applicant_id,
            drawings = stored.drawings.len(),
            "project submitted"
        );

        self.notify(NotificationDraft {
            user_id: stored.applicant_id.clone(),
            kind: NotificationKind::Success,
            title: "تم استلام مشروعك".to_string(),
            body: format!("تم استلام مشروع \"{}\" وجاري مراجعته.", stored.project_name),
            project_id: Some(stored.id.clone()),
        });

        Ok(stored)
    }

    pub fn get(&self, project_id: &ProjectId) -> Result<Project, ReviewServiceError> {
        self.load(project_id)
    }

    pub fn projects_for(&self, applicant_id: &UserId) -> Result<Vec<Project>, ReviewServiceError> {
        Ok(self.repository.by_applicant(applicant_id)?)
    }

    pub fn add_drawing(
        &self,
        project_id: &ProjectId,
        upload: DrawingUpload,
    ) -> Result<Drawing, ReviewServiceError> {
        if upload.file_name.trim().is_empty() {
            return Err(ReviewServiceError::Invalid(
                "drawing file name must not be empty".to_string(),
            ));
        }

        let mut project = self.load(project_id)?;
        let drawing = self.drawing_from(upload, Utc::now());
        project.drawings.push(drawing.clone());
        self.repository.update(project)?;

        tracing::debug!(project_id = %project_id, drawing_id = %drawing.id, "drawing attached");
        Ok(drawing)
    }

    /// Edit project metadata. The review status is left as it was.
    pub fn update_project(
        &self,
        project_id: &ProjectId,
        update: ProjectUpdate,
    ) -> Result<Project, ReviewServiceError> {
        let mut project = self.load(project_id)?;
        if let Some(name) = update.project_name {
            if name.trim().is_empty() {
                return Err(ReviewServiceError::Invalid(
                    "project name must not be empty".to_string(),
                ));
            }
            project.project_name = name.trim().to_string();
        }
        if let Some(building) = update.building {
            validate_building(&building)?;
            project.building = building;
        }
        if let Some(location) = update.location {
            project.location = location;
        }
        Ok(self.repository.update(project)?)
    }

    /// Score the project's drawings, attach the report, and move the project
    /// to the resulting status.
    ///
    /// A storage failure does not undo the computed review; it is returned as
    /// `persistence_warning`. A concurrent edit is retried once against the
    /// latest revision.
    pub async fn evaluate(&self, project_id: &ProjectId) -> Result<ReviewOutcome, ReviewServiceError> {
        let mut project = self.load(project_id)?;
        tracing::info!(
            project_id = %project.id,
            analyzer = self.analyzer.name(),
            drawings = project.drawings.len(),
            "evaluating project"
        );

        let evaluation = self.evaluator.assess(&project, self.analyzer.as_ref()).await;
        let now = Utc::now();
        let report = evaluation.to_report(self.next_id("auto"), project.id.clone(), now);

        apply_review(&mut project, &report, None, now);
        let license = if evaluation.status == ReviewStatus::Approved {
            match self.licenses.issue(&project, now) {
                Ok(license) => Some(license),
                Err(err) => {
                    tracing::warn!(project_id = %project.id, error = %err, "license issuance failed");
                    None
                }
            }
        } else {
            None
        };
        apply_review(&mut project, &report, license.as_ref(), now);

        let persistence_warning = self.persist_review(&project, &report, license.as_ref(), now);

        tracing::info!(
            project_id = %project.id,
            score = evaluation.score,
            status = evaluation.status.label(),
            critical = evaluation.counts.critical_issues,
            degraded = evaluation.degraded,
            "evaluation finished"
        );

        self.notify(NotificationDraft {
            user_id: project.applicant_id.clone(),
            kind: notification_kind(evaluation.status),
            title: "نتيجة مراجعة المشروع".to_string(),
            body: format!(
                "تم {} مشروعك بناءً على تحليل الرسومات وفقاً للكود المصري ({}%)",
                decision_phrase(evaluation.status),
                evaluation.score
            ),
            project_id: Some(project.id.clone()),
        });
        if let Some(license) = &license {
            self.notify_license(&project, license);
        }

        let ComplianceEvaluation {
            score,
            status,
            reasons,
            degraded,
            ..
        } = evaluation;

        Ok(ReviewOutcome {
            project_id: project.id,
            score,
            status,
            reasons,
            report,
            license,
            persistence_warning,
            degraded,
        })
    }

    fn persist_review(
        &self,
        project: &Project,
        report: &ReviewReport,
        license: Option<&License>,
        reviewed_at: DateTime<Utc>,
    ) -> Option<String> {
        let first = match self.repository.update(project.clone()) {
            Ok(_) => return None,
            Err(err) => err,
        };

        let retried = match first {
            RepositoryError::Stale { .. } => {
                tracing::debug!(project_id = %project.id, "project changed during evaluation; retrying");
                self.repository.fetch(&project.id).and_then(|latest| {
                    let mut latest = latest.ok_or(RepositoryError::NotFound)?;
                    apply_review(&mut latest, report, license, reviewed_at);
                    self.repository.update(latest)
                })
            }
            other => Err(other),
        };

        match retried {
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(project_id = %project.id, error = %err, "failed to persist review");
                Some(err.to_string())
            }
        }
    }

    fn notify_license(&self, project: &Project, license: &License) {
        tracing::info!(
            project_id = %project.id,
            license_number = %license.license_number,
            "license issued"
        );
        self.notify(NotificationDraft {
            user_id: project.applicant_id.clone(),
            kind: NotificationKind::Success,
            title: "تم إصدار الترخيص".to_string(),
            body: format!("تم إصدار ترخيص المشروع رقم {}.", license.license_number),
            project_id: Some(project.id.clone()),
        });
    }

    /// Record a reviewer's findings for one drawing.
    pub fn review_drawing(
        &self,
        drawing_id: &DrawingId,
        issues: Vec<IssueRecord>,
    ) -> Result<Drawing, ReviewServiceError> {
        let mut project = self
            .repository
            .all()?
            .into_iter()
            .find(|project| project.drawings.iter().any(|drawing| &drawing.id == drawing_id))
            .ok_or_else(|| ReviewServiceError::DrawingNotFound(drawing_id.clone()))?;

        let status = drawing_status(&issues);
        let drawing = project
            .drawing_mut(drawing_id)
            .ok_or_else(|| ReviewServiceError::DrawingNotFound(drawing_id.clone()))?;
        drawing.review_results = issues;
        drawing.status = status;
        let reviewed = drawing.clone();

        self.repository.update(project)?;
        Ok(reviewed)
    }

    /// Build a report from the reviewer-recorded findings on every drawing.
    pub fn create_review_report(
        &self,
        project_id: &ProjectId,
        reviewer_id: &UserId,
    ) -> Result<ReviewReport, ReviewServiceError> {
        let mut project = self.load(project_id)?;
        let issues = project.review_results();
        let counts = IssueCounts::from_issues(&issues);
        let score = manual_report_score(&counts);
        let status = manual_status(&counts);
        let now = Utc::now();

        let report = ReviewReport {
            id: self.next_id("report"),
            project_id: project.id.clone(),
            overall_status: status,
            compliance_score: score,
            counts,
            recommendations: generate_with_context(&issues, status, &counts),
            generated_at: now,
            reviewer_id: reviewer_id.0.clone(),
            reasons: Vec::new(),
            findings: Vec::new(),
        };
        apply_review(&mut project, &report, None, now);
        let stored = self.repository.update(project)?;

        tracing::info!(
            project_id = %stored.id,
            reviewer_id = %reviewer_id,
            score,
            status = status.label(),
            "review report created"
        );
        self.notify(NotificationDraft {
            user_id: stored.applicant_id.clone(),
            kind: notification_kind(status),
            title: "نتيجة مراجعة المشروع".to_string(),
            body: format!("الحالة: {} - درجة الامتثال: {}%", status.label(), score),
            project_id: Some(stored.id.clone()),
        });

        Ok(report)
    }

    /// Regenerate a report's recommendation text from the current findings.
    ///
    /// Automated reports are rebuilt from their own counts and stored reasons;
    /// manual reports from the reviewer records on the drawings. Status, score
    /// and counts are left untouched and nobody is notified. Returns `None`
    /// when the project has no report yet.
    pub fn refresh_report_recommendations(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<ReviewReport>, ReviewServiceError> {
        let mut project = self.load(project_id)?;
        let issues = project.review_results();
        let counts = IssueCounts::from_issues(&issues);
        let Some(report) = project.review_report.as_mut() else {
            return Ok(None);
        };

        let recommendations = if report.is_automated() {
            // Reports written before reasons were stored have nothing to rebuild from.
            if report.reasons.is_empty() {
                return Ok(Some(report.clone()));
            }
            automated_lines(&report.counts, &report.reasons)
        } else {
            generate_with_context(&issues, report.overall_status, &counts)
        };
        if report.recommendations == recommendations {
            return Ok(Some(report.clone()));
        }
        report.recommendations = recommendations;
        let refreshed = report.clone();
        self.repository.update(project)?;
        Ok(Some(refreshed))
    }

    /// Refresh every project that has a report. Returns how many were refreshed.
    pub fn refresh_all_reports(&self) -> Result<usize, ReviewServiceError> {
        let ids: Vec<ProjectId> = self
            .repository
            .all()?
            .into_iter()
            .filter(|project| project.review_report.is_some())
            .map(|project| project.id)
            .collect();

        for id in &ids {
            self.refresh_report_recommendations(id)?;
        }
        tracing::debug!(refreshed = ids.len(), "report recommendations refreshed");
        Ok(ids.len())
    }

    /// Issue a license for an already approved project.
    pub fn issue_license(&self, project_id: &ProjectId) -> Result<License, ReviewServiceError> {
        let mut project = self.load(project_id)?;
        let license = self.licenses.issue(&project, Utc::now())?;
        project.approved_at = Some(license.issued_at);
        project.license = Some(license.clone());
        let stored = self.repository.update(project)?;
        self.notify_license(&stored, &license);
        Ok(license)
    }

    pub fn applicant_stats(
        &self,
        applicant_id: &UserId,
    ) -> Result<ApplicantProjectStats, ReviewServiceError> {
        let projects = self.repository.by_applicant(applicant_id)?;
        Ok(ApplicantProjectStats::tally(&projects))
    }
}

fn validate_building(building: &BuildingProfile) -> Result<(), ReviewServiceError> {
    if building.building_type.trim().is_empty() {
        return Err(ReviewServiceError::Invalid(
            "building type must not be empty".to_string(),
        ));
    }
    if !building.area.is_finite() || building.area <= 0.0 {
        return Err(ReviewServiceError::Invalid(
            "building area must be a positive number".to_string(),
        ));
    }
    if building.floors == 0 {
        return Err(ReviewServiceError::Invalid(
            "building must have at least one floor".to_string(),
        ));
    }
    Ok(())
}

fn validate_submission(submission: &ProjectSubmission) -> Result<(), ReviewServiceError> {
    if submission.applicant_id.0.trim().is_empty() {
        return Err(ReviewServiceError::Invalid(
            "applicant id must not be empty".to_string(),
        ));
    }
    if submission.project_name.trim().is_empty() {
        return Err(ReviewServiceError::Invalid(
            "project name must not be empty".to_string(),
        ));
    }
    validate_building(&submission.building)
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("drawing {0} not found")]
    DrawingNotFound(DrawingId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    License(#[from] LicenseError),
}
