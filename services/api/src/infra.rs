use chantier_trace::projects::{Project, ProjectId, ProjectRepository, ProjectType, RepositoryError};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local project store with revision checks on update.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProjectRepository {
    records: Arc<Mutex<HashMap<ProjectId, Project>>>,
}

impl InMemoryProjectRepository {
    fn guard(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ProjectId, Project>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ProjectRepository for InMemoryProjectRepository {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update(&self, mut project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.guard()?;
        let stored = guard.get(&project.id).ok_or(RepositoryError::NotFound)?;
        if stored.revision != project.revision {
            return Err(RepositoryError::Conflict);
        }
        project.revision += 1;
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        Ok(self.guard()?.values().cloned().collect())
    }

    fn remove(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        self.guard()?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_project_type(raw: &str) -> Result<ProjectType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "individual" | "maison" => Ok(ProjectType::Individual),
        "renovation" => Ok(ProjectType::Renovation),
        "tertiary" | "tertiaire" => Ok(ProjectType::Tertiary),
        other => Err(format!(
            "unknown project type '{other}' (expected individual, renovation or tertiary)"
        )),
    }
}
