use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Project, ProjectId, ProjectStatus, ProjectType};
use super::scoring::RiskLevel;

/// Storage abstraction so the service can run against any persistent store.
///
/// `update` must reject a project whose `revision` differs from the stored one
/// with [`RepositoryError::Conflict`], and store it with the revision bumped.
pub trait ProjectRepository: Send + Sync {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError>;
    fn update(&self, project: Project) -> Result<Project, RepositoryError>;
    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn list(&self) -> Result<Vec<Project>, RepositoryError>;
    fn remove(&self, id: &ProjectId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists or was modified concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Public snapshot of a project's traceability state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub project_id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub project_type: ProjectType,
    pub initial_score: u8,
    pub current_score: u8,
    pub current_risk_level: RiskLevel,
    pub decision_count: usize,
    pub company_count: usize,
    pub site_report_count: usize,
    pub open_snag_count: usize,
    pub payment_application_count: usize,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn view(&self) -> ProjectView {
        ProjectView {
            project_id: self.id.clone(),
            name: self.name.clone(),
            status: self.status(),
            project_type: self.project_type,
            initial_score: self.initial_score(),
            current_score: self.current_score(),
            current_risk_level: self.current_risk_level(),
            decision_count: self.decisions().len(),
            company_count: self.companies.len(),
            site_report_count: self.site_reports.len(),
            open_snag_count: self.open_snag_count(),
            payment_application_count: self.payment_applications.len(),
            created_at: self.created_at,
        }
    }
}
