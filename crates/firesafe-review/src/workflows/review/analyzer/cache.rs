use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::super::domain::{Project, ProjectId};
use super::{AnalyzerError, DrawingAnalysis, DrawingAnalyzer};

/// Serves analyses pushed in by an external review service, falling back to
/// the wrapped analyzer for projects that have none.
pub struct ExternalAnalysisCache<A> {
    fallback: A,
    entries: RwLock<HashMap<ProjectId, DrawingAnalysis>>,
}

impl<A> ExternalAnalysisCache<A>
where
    A: DrawingAnalyzer,
{
    pub fn new(fallback: A) -> Self {
        Self {
            fallback,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store the analysis for `project_id`, replacing any earlier one.
    pub fn ingest(&self, project_id: ProjectId, analysis: DrawingAnalysis) {
        let mut guard = self.entries.write().expect("analysis cache lock poisoned");
        guard.insert(project_id, analysis);
    }

    pub fn evict(&self, project_id: &ProjectId) -> Option<DrawingAnalysis> {
        let mut guard = self.entries.write().expect("analysis cache lock poisoned");
        guard.remove(project_id)
    }

    pub fn cached(&self, project_id: &ProjectId) -> Option<DrawingAnalysis> {
        let guard = self.entries.read().expect("analysis cache lock poisoned");
        guard.get(project_id).cloned()
    }
}

#[async_trait]
impl<A> DrawingAnalyzer for ExternalAnalysisCache<A>
where
    A: DrawingAnalyzer,
{
    fn name(&self) -> &'static str {
        self.fallback.name()
    }

    async fn analyze(&self, project: &Project) -> Result<DrawingAnalysis, AnalyzerError> {
        if let Some(analysis) = self.cached(&project.id) {
            tracing::debug!(project_id = %project.id, "serving cached external analysis");
            return Ok(analysis);
        }
        self.fallback.analyze(project).await
    }
}
