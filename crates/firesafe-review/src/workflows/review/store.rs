use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::domain::{Project, ProjectId, UserId};
use super::repository::{ProjectRepository, ProjectTable, RepositoryError};

pub const PROJECTS_FILE: &str = "firecode_projects.json";

/// Process-local project store used by tests and the default server.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    table: Mutex<ProjectTable>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectRepository for InMemoryProjectStore {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.table.lock().expect("project store mutex poisoned");
        guard.insert(project)
    }

    fn update(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.table.lock().expect("project store mutex poisoned");
        guard.update(project)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let guard = self.table.lock().expect("project store mutex poisoned");
        Ok(guard.fetch(id))
    }

    fn by_applicant(&self, applicant_id: &UserId) -> Result<Vec<Project>, RepositoryError> {
        let guard = self.table.lock().expect("project store mutex poisoned");
        Ok(guard.by_applicant(applicant_id))
    }

    fn all(&self) -> Result<Vec<Project>, RepositoryError> {
        let guard = self.table.lock().expect("project store mutex poisoned");
        Ok(guard.projects().to_vec())
    }
}

/// Project store persisted as one JSON array under the data directory.
///
/// Mutations apply in memory first and are then written through. A failed
/// write is reported as `Unavailable` but the in-memory change stands.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<ProjectTable>,
}

impl JsonFileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|err| {
            RepositoryError::Unavailable(format!("create {}: {err}", dir.display()))
        })?;
        let path = dir.join(PROJECTS_FILE);
        let projects = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                RepositoryError::Unavailable(format!("parse {}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                return Err(RepositoryError::Unavailable(format!(
                    "read {}: {err}",
                    path.display()
                )))
            }
        };
        tracing::debug!(path = %path.display(), "opened project store");
        Ok(Self {
            path,
            table: Mutex::new(ProjectTable::from_projects(projects)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, table: &ProjectTable) -> Result<(), RepositoryError> {
        let bytes = serde_json::to_vec_pretty(table.projects())
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
        fs::write(&self.path, bytes).map_err(|err| {
            RepositoryError::Unavailable(format!("write {}: {err}", self.path.display()))
        })
    }
}

impl ProjectRepository for JsonFileStore {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.table.lock().expect("project store mutex poisoned");
        let stored = guard.insert(project)?;
        self.flush(&guard)?;
        Ok(stored)
    }

    fn update(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.table.lock().expect("project store mutex poisoned");
        let stored = guard.update(project)?;
        self.flush(&guard)?;
        Ok(stored)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let guard = self.table.lock().expect("project store mutex poisoned");
        Ok(guard.fetch(id))
    }

    fn by_applicant(&self, applicant_id: &UserId) -> Result<Vec<Project>, RepositoryError> {
        let guard = self.table.lock().expect("project store mutex poisoned");
        Ok(guard.by_applicant(applicant_id))
    }

    fn all(&self) -> Result<Vec<Project>, RepositoryError> {
        let guard = self.table.lock().expect("project store mutex poisoned");
        Ok(guard.projects().to_vec())
    }
}
