use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::review::analyzer::{AnalyzerError, DrawingAnalysis, DrawingAnalyzer};
use crate::workflows::review::catalog::RuleCatalog;
use crate::workflows::review::domain::{
    BuildingProfile, Drawing, DrawingId, DrawingStatus, DrawingUpload, Project, ProjectId,
    ProjectStatus, ProjectSubmission, SiteLocation, UserId,
};
use crate::workflows::review::evaluation::EvaluationConfig;
use crate::workflows::review::notifications::{
    Notification, NotificationDraft, NotificationError, NotificationSink,
};
use crate::workflows::review::repository::{ProjectRepository, RepositoryError};
use crate::workflows::review::service::ReviewService;
use crate::workflows::review::store::InMemoryProjectStore;

pub(super) const APPLICANT: &str = "applicant-042";

pub(super) fn building(building_type: &str, area: f64, floors: u16) -> BuildingProfile {
    BuildingProfile {
        building_type: building_type.to_string(),
        area,
        floors,
        height: Some(floors as f64 * 3.5),
        basement_floors: Some(1),
        parking_spaces: None,
        total_occupancy: Some(180),
        occupancy_type: None,
        construction_type: Some("خرسانة مسلحة".to_string()),
    }
}

pub(super) fn upload(file_name: &str, file_type: &str) -> DrawingUpload {
    DrawingUpload {
        file_name: file_name.to_string(),
        file_type: file_type.to_string(),
        file_size: 240_000,
    }
}

pub(super) fn submission(drawings: Vec<DrawingUpload>) -> ProjectSubmission {
    ProjectSubmission {
        applicant_id: UserId(APPLICANT.to_string()),
        project_name: "مركز الزمالك التجاري".to_string(),
        building: building("تجاري", 1200.0, 4),
        location: SiteLocation {
            location: "القاهرة".to_string(),
            address: Some("شارع 26 يوليو".to_string()),
            latitude: Some(30.0626),
            longitude: Some(31.2197),
        },
        drawings,
    }
}

/// Project as the service would store it, for exercising the evaluator directly.
pub(super) fn project_with(drawings: &[DrawingUpload]) -> Project {
    let now = Utc::now();
    Project {
        id: ProjectId("prj-test".to_string()),
        applicant_id: UserId(APPLICANT.to_string()),
        project_name: "مركز الزمالك التجاري".to_string(),
        building: building("تجاري", 1200.0, 4),
        location: SiteLocation::default(),
        status: ProjectStatus::Submitted,
        submitted_at: now,
        reviewed_at: None,
        approved_at: None,
        drawings: drawings
            .iter()
            .enumerate()
            .map(|(index, upload)| Drawing {
                id: DrawingId(format!("drw-test-{index}")),
                file_name: upload.file_name.clone(),
                file_type: upload.file_type.clone(),
                file_size: upload.file_size,
                uploaded_at: now,
                status: DrawingStatus::Pending,
                review_results: Vec::new(),
            })
            .collect(),
        review_report: None,
        license: None,
        revision: 0,
    }
}

pub(super) fn analysis(critical: u32, major: u32, minor: u32) -> DrawingAnalysis {
    DrawingAnalysis {
        critical,
        major,
        minor,
        ..DrawingAnalysis::default()
    }
}

/// Analyzer returning a canned result and counting its calls.
#[derive(Default)]
pub(super) struct FixedAnalyzer {
    result: DrawingAnalysis,
    calls: AtomicUsize,
}

impl FixedAnalyzer {
    pub(super) fn new(result: DrawingAnalysis) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DrawingAnalyzer for FixedAnalyzer {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn analyze(&self, _project: &Project) -> Result<DrawingAnalysis, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

pub(super) struct FailingAnalyzer;

#[async_trait]
impl DrawingAnalyzer for FailingAnalyzer {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn analyze(&self, _project: &Project) -> Result<DrawingAnalysis, AnalyzerError> {
        Err(AnalyzerError::Unavailable("analysis backend timed out".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    sent: Arc<Mutex<Vec<NotificationDraft>>>,
}

impl MemoryNotifications {
    pub(super) fn sent(&self) -> Vec<NotificationDraft> {
        self.sent.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationSink for MemoryNotifications {
    fn notify(&self, draft: NotificationDraft) -> Result<Notification, NotificationError> {
        let notification = Notification {
            id: format!("ntf-{}", self.sent().len() + 1),
            user_id: draft.user_id.clone(),
            kind: draft.kind,
            title: draft.title.clone(),
            body: draft.body.clone(),
            project_id: draft.project_id.clone(),
            created_at: Utc::now(),
            read: false,
        };
        self.sent
            .lock()
            .expect("notification mutex poisoned")
            .push(draft);
        Ok(notification)
    }
}

pub(super) struct OfflineNotifications;

impl NotificationSink for OfflineNotifications {
    fn notify(&self, _draft: NotificationDraft) -> Result<Notification, NotificationError> {
        Err(NotificationError::Unavailable("smtp relay down".to_string()))
    }
}

/// In-memory store whose updates can be switched off, or made to race once
/// with a concurrent writer.
#[derive(Default)]
pub(super) struct FlakyRepository {
    pub(super) inner: InMemoryProjectStore,
    fail_updates: AtomicBool,
    race_next_update: AtomicBool,
}

impl FlakyRepository {
    pub(super) fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub(super) fn race_next_update(&self) {
        self.race_next_update.store(true, Ordering::SeqCst);
    }
}

impl ProjectRepository for FlakyRepository {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        self.inner.insert(project)
    }

    fn update(&self, project: Project) -> Result<Project, RepositoryError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("disk full".to_string()));
        }
        if self.race_next_update.swap(false, Ordering::SeqCst) {
            let mut concurrent = self
                .inner
                .fetch(&project.id)?
                .ok_or(RepositoryError::NotFound)?;
            concurrent.project_name = format!("{} (معدل)", concurrent.project_name);
            self.inner.update(concurrent)?;
        }
        self.inner.update(project)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn by_applicant(&self, applicant_id: &UserId) -> Result<Vec<Project>, RepositoryError> {
        self.inner.by_applicant(applicant_id)
    }

    fn all(&self) -> Result<Vec<Project>, RepositoryError> {
        self.inner.all()
    }
}

pub(super) fn catalog() -> Arc<RuleCatalog> {
    Arc::new(RuleCatalog::builtin().expect("builtin catalog"))
}

pub(super) fn build_service<R>(
    repository: Arc<R>,
    analyzer: Arc<dyn DrawingAnalyzer>,
) -> (ReviewService<R, MemoryNotifications>, Arc<MemoryNotifications>)
where
    R: ProjectRepository + 'static,
{
    let notifications = Arc::new(MemoryNotifications::default());
    let service = ReviewService::new(
        repository,
        notifications.clone(),
        catalog(),
        EvaluationConfig::default(),
    )
    .with_analyzer(analyzer);
    (service, notifications)
}

pub(super) fn memory_service(
    analyzer: Arc<dyn DrawingAnalyzer>,
) -> (
    ReviewService<InMemoryProjectStore, MemoryNotifications>,
    Arc<InMemoryProjectStore>,
    Arc<MemoryNotifications>,
) {
    let repository = Arc::new(InMemoryProjectStore::new());
    let (service, notifications) = build_service(repository.clone(), analyzer);
    (service, repository, notifications)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
