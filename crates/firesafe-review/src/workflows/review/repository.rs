use super::domain::{Project, ProjectId, UserId};

/// Storage abstraction so the review service can be exercised in isolation.
///
/// `update` is optimistic: the caller's `revision` must match the stored one,
/// and the stored copy comes back with the revision bumped.
pub trait ProjectRepository: Send + Sync {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError>;
    fn update(&self, project: Project) -> Result<Project, RepositoryError>;
    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn by_applicant(&self, applicant_id: &UserId) -> Result<Vec<Project>, RepositoryError>;
    fn all(&self) -> Result<Vec<Project>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("project already exists")]
    Conflict,
    #[error("project was modified concurrently (expected revision {expected}, found {found})")]
    Stale { expected: u64, found: u64 },
    #[error("project not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Ordered project table shared by the concrete stores.
#[derive(Debug, Default)]
pub(crate) struct ProjectTable {
    projects: Vec<Project>,
}

impl ProjectTable {
    pub(crate) fn from_projects(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub(crate) fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub(crate) fn insert(&mut self, project: Project) -> Result<Project, RepositoryError> {
        if self.projects.iter().any(|existing| existing.id == project.id) {
            return Err(RepositoryError::Conflict);
        }
        self.projects.push(project.clone());
        Ok(project)
    }

    pub(crate) fn update(&mut self, mut project: Project) -> Result<Project, RepositoryError> {
        let stored = self
            .projects
            .iter_mut()
            .find(|existing| existing.id == project.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.revision != project.revision {
            return Err(RepositoryError::Stale {
                expected: project.revision,
                found: stored.revision,
            });
        }
        project.revision += 1;
        *stored = project.clone();
        Ok(project)
    }

    pub(crate) fn fetch(&self, id: &ProjectId) -> Option<Project> {
        self.projects
            .iter()
            .find(|project| &project.id == id)
            .cloned()
    }

    pub(crate) fn by_applicant(&self, applicant_id: &UserId) -> Vec<Project> {
        self.projects
            .iter()
            .filter(|project| &project.applicant_id == applicant_id)
            .cloned()
            .collect()
    }
}
