use firesafe_review::config::{AnalyzerKind, ReviewConfig};
use firesafe_review::error::AppError;
use firesafe_review::workflows::review::{
    DrawingAnalyzer, ExternalAnalysisCache, InMemoryProjectStore, JsonFileStore, KeywordHeuristicAnalyzer,
    NoopAnalyzer, NotificationCenter, Project, ProjectId, ProjectRepository, RepositoryError,
    ReviewService, RuleCatalog, SimulatedCodeAnalyzer, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Project storage picked at startup: a JSON file when a data directory is
/// configured, process memory otherwise.
pub(crate) enum ProjectStore {
    Memory(InMemoryProjectStore),
    File(JsonFileStore),
}

impl ProjectRepository for ProjectStore {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        match self {
            ProjectStore::Memory(store) => store.insert(project),
            ProjectStore::File(store) => store.insert(project),
        }
    }

    fn update(&self, project: Project) -> Result<Project, RepositoryError> {
        match self {
            ProjectStore::Memory(store) => store.update(project),
            ProjectStore::File(store) => store.update(project),
        }
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        match self {
            ProjectStore::Memory(store) => store.fetch(id),
            ProjectStore::File(store) => store.fetch(id),
        }
    }

    fn by_applicant(&self, applicant_id: &UserId) -> Result<Vec<Project>, RepositoryError> {
        match self {
            ProjectStore::Memory(store) => store.by_applicant(applicant_id),
            ProjectStore::File(store) => store.by_applicant(applicant_id),
        }
    }

    fn all(&self) -> Result<Vec<Project>, RepositoryError> {
        match self {
            ProjectStore::Memory(store) => store.all(),
            ProjectStore::File(store) => store.all(),
        }
    }
}

pub(crate) type ApiReviewService = ReviewService<ProjectStore, NotificationCenter>;

/// Configured analyzer behind a cache of externally ingested analyses.
pub(crate) type AnalysisCache = ExternalAnalysisCache<Arc<dyn DrawingAnalyzer>>;

/// Everything the HTTP layer and the CLI share.
pub(crate) struct ReviewStack {
    pub(crate) service: Arc<ApiReviewService>,
    pub(crate) notifications: Arc<NotificationCenter>,
    pub(crate) analyses: Arc<AnalysisCache>,
}

pub(crate) fn build_analyzer(kind: AnalyzerKind, seed: Option<u64>) -> Arc<dyn DrawingAnalyzer> {
    match kind {
        AnalyzerKind::None => Arc::new(NoopAnalyzer),
        AnalyzerKind::Heuristic => Arc::new(KeywordHeuristicAnalyzer),
        AnalyzerKind::Simulated => match seed {
            Some(seed) => Arc::new(SimulatedCodeAnalyzer::seeded(seed)),
            None => Arc::new(SimulatedCodeAnalyzer::from_entropy()),
        },
    }
}

pub(crate) fn build_review_stack(config: &ReviewConfig) -> Result<ReviewStack, AppError> {
    let (repository, notifications) = match &config.data_dir {
        Some(dir) => {
            let store = JsonFileStore::open(dir)?;
            let notifications = NotificationCenter::open(dir)?;
            tracing::info!(path = %store.path().display(), "using JSON project store");
            (ProjectStore::File(store), notifications)
        }
        None => (
            ProjectStore::Memory(InMemoryProjectStore::new()),
            NotificationCenter::in_memory(),
        ),
    };

    let catalog = Arc::new(RuleCatalog::builtin()?);
    let notifications = Arc::new(notifications);
    let analyses = Arc::new(ExternalAnalysisCache::new(build_analyzer(
        config.analyzer,
        config.simulation_seed,
    )));
    let service = ReviewService::new(
        Arc::new(repository),
        notifications.clone(),
        catalog,
        config.evaluation.clone(),
    )
    .with_analyzer(analyses.clone());

    tracing::info!(analyzer = service.analyzer_name(), "review service assembled");
    Ok(ReviewStack {
        service: Arc::new(service),
        notifications,
        analyses,
    })
}

pub(crate) fn parse_analyzer(raw: &str) -> Result<AnalyzerKind, String> {
    AnalyzerKind::parse(raw).map_err(|err| err.to_string())
}
