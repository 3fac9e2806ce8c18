use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::projects::calibration::{
    CalibrationAnswer, NewProjectCalibration, OngoingProjectCalibration, ProjectCalibration,
};
use crate::projects::domain::{
    CompanyDraft, Decision, DecisionDraft, DecisionId, DecisionType, PaymentApplicationDraft,
    CompanyId, PaymentId, PaymentStatus, Project, ProjectDraft, ProjectId, ProjectType,
};
use crate::projects::repository::{ProjectRepository, RepositoryError};
use crate::projects::{project_router, ProjectService};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn new_project_draft(answer: CalibrationAnswer) -> ProjectDraft {
    ProjectDraft {
        name: "Maison Lefèvre".to_string(),
        client: Some("M. et Mme Lefèvre".to_string()),
        address: Some("12 rue des Tilleuls, Nantes".to_string()),
        project_type: ProjectType::Individual,
        calibration: ProjectCalibration::New(NewProjectCalibration::uniform(answer)),
    }
}

pub(super) fn ongoing_project_draft(project_type: ProjectType) -> ProjectDraft {
    ProjectDraft {
        name: "Bureaux Quai Ouest".to_string(),
        client: Some("SCI Quai Ouest".to_string()),
        address: None,
        project_type,
        calibration: ProjectCalibration::Ongoing(OngoingProjectCalibration::default()),
    }
}

pub(super) fn decision_draft(
    decision_type: DecisionType,
    has_written_validation: bool,
    has_proof_attached: bool,
) -> DecisionDraft {
    DecisionDraft {
        title: format!("{} decision", decision_type.label()),
        description: None,
        decision_type,
        decided_on: date(2025, 4, 2),
        company_id: None,
        has_written_validation,
        has_proof_attached,
        has_financial_impact: false,
        amount: None,
    }
}

pub(super) fn amendment_draft(company_id: &CompanyId, amount: f64) -> DecisionDraft {
    DecisionDraft {
        title: "Avenant n°1".to_string(),
        description: Some("Extra insulation on the north wall".to_string()),
        decision_type: DecisionType::Financial,
        decided_on: date(2025, 5, 14),
        company_id: Some(company_id.clone()),
        has_written_validation: true,
        has_proof_attached: true,
        has_financial_impact: true,
        amount: Some(amount),
    }
}

pub(super) fn company_draft(name: &str, contract_amount: f64) -> CompanyDraft {
    CompanyDraft {
        name: name.to_string(),
        trade: "Gros œuvre".to_string(),
        contract_amount,
    }
}

pub(super) fn payment_draft(
    company_id: &CompanyId,
    number: u32,
    validated_amount: f64,
) -> PaymentApplicationDraft {
    PaymentApplicationDraft {
        company_id: company_id.clone(),
        number,
        period_end: date(2025, number.clamp(1, 12), 28),
        validated_amount,
        has_retenue_garantie: true,
    }
}

/// Walk a payment forward through the allowed transitions until it reaches `target`.
pub(super) fn advance_payment(
    service: &ProjectService<MemoryRepository>,
    project_id: &ProjectId,
    payment_id: &PaymentId,
    target: PaymentStatus,
) {
    let path = [
        PaymentStatus::Submitted,
        PaymentStatus::Validated,
        PaymentStatus::Paid,
    ];
    for step in path {
        service
            .transition_payment(project_id, payment_id, step)
            .expect("transition allowed");
        if step == target {
            return;
        }
    }
}

/// Decision fixture with an explicit impact, bypassing the impact rules.
pub(super) fn scored_decision(id: &str, score_impact: i32) -> Decision {
    Decision {
        id: DecisionId(id.to_string()),
        title: format!("decision {id}"),
        description: None,
        decision_type: DecisionType::Modification,
        decided_on: date(2025, 2, 1),
        company_id: None,
        has_written_validation: score_impact > 0,
        has_proof_attached: score_impact > 0,
        has_financial_impact: false,
        amount: None,
        score_impact,
        recorded_at: Utc
            .with_ymd_and_hms(2025, 2, 1, 8, 30, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) fn build_service() -> (ProjectService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ProjectService::new(repository.clone());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ProjectId, Project>>>,
}

impl ProjectRepository for MemoryRepository {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update(&self, mut project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.get(&project.id).ok_or(RepositoryError::NotFound)?;
        if stored.revision != project.revision {
            return Err(RepositoryError::Conflict);
        }
        project.revision += 1;
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn remove(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

/// Repository that bumps the stored revision behind the service's back on every fetch.
#[derive(Default, Clone)]
pub(super) struct RacingRepository {
    pub(super) inner: MemoryRepository,
}

impl ProjectRepository for RacingRepository {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        self.inner.insert(project)
    }

    fn update(&self, project: Project) -> Result<Project, RepositoryError> {
        self.inner.update(project)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let fetched = self.inner.fetch(id)?;
        if let Some(project) = &fetched {
            self.inner.update(project.clone())?;
        }
        Ok(fetched)
    }

    fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        self.inner.list()
    }

    fn remove(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        self.inner.remove(id)
    }
}

pub(super) struct UnavailableRepository;

impl ProjectRepository for UnavailableRepository {
    fn insert(&self, _project: Project) -> Result<Project, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _project: Project) -> Result<Project, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: &ProjectId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: ProjectService<MemoryRepository>) -> axum::Router {
    project_router(Arc::new(service))
}
