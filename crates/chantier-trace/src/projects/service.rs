use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::calibration::ProjectCalibration;
use super::dashboard::PortfolioSummary;
use super::domain::{
    Company, CompanyDraft, CompanyId, Decision, DecisionDraft, DecisionId, PaymentApplication,
    PaymentApplicationDraft, PaymentId, PaymentStatus, Project, ProjectDraft, ProjectId, ProjectType,
    SiteReport, SiteReportDraft, SiteReportId, Snag, SnagDraft, SnagId, SnagStatus,
};
use super::finance::FinancialProgress;
use super::repository::{ProjectRepository, ProjectView, RepositoryError};
use super::scoring::{self, InitialScoreBreakdown, ScorePoint};

/// Service composing the repository with the scoring and financial rules.
pub struct ProjectService<R> {
    repository: Arc<R>,
}

static ENTITY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    let id = ENTITY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

/// Decision as stored, with the project state it produced.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionReceipt {
    pub decision: Decision,
    pub project: ProjectView,
}

impl<R> ProjectService<R>
where
    R: ProjectRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Register a project and fix its initial score from the calibration.
    pub fn create_project(&self, draft: ProjectDraft) -> Result<Project, ProjectServiceError> {
        require_text(&draft.name, "project name")?;

        let project = Project::new(ProjectId(next_id("prj")), draft, Utc::now());
        let stored = self.repository.insert(project)?;

        info!(
            project_id = %stored.id,
            status = stored.status().label(),
            project_type = stored.project_type.label(),
            initial_score = stored.initial_score(),
            risk_level = stored.current_risk_level().label(),
            "project registered"
        );
        Ok(stored)
    }

    pub fn get(&self, project_id: &ProjectId) -> Result<Project, ProjectServiceError> {
        let project = self
            .repository
            .fetch(project_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(project)
    }

    /// Projects in creation order. Ids break ties by length first so that
    /// `prj-1000000` sorts after `prj-999999`.
    pub fn list(&self) -> Result<Vec<Project>, ProjectServiceError> {
        let mut projects = self.repository.list()?;
        projects.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.0.len().cmp(&b.id.0.len()))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(projects)
    }

    pub fn delete(&self, project_id: &ProjectId) -> Result<(), ProjectServiceError> {
        self.repository.remove(project_id)?;
        info!(project_id = %project_id, "project deleted");
        Ok(())
    }

    /// Score a decision, append it and recompute the project score.
    pub fn add_decision(
        &self,
        project_id: &ProjectId,
        draft: DecisionDraft,
    ) -> Result<DecisionReceipt, ProjectServiceError> {
        require_text(&draft.title, "decision title")?;
        if let Some(amount) = draft.amount {
            require_finite(amount, "decision amount")?;
        }

        let (decision, project) = self.modify(project_id, |project| {
            if let Some(company_id) = &draft.company_id {
                require_company(project, company_id)?;
            }
            let decision = Decision::from_draft(DecisionId(next_id("dec")), draft, Utc::now());
            project.append_decision(decision.clone());
            Ok(decision)
        })?;

        info!(
            project_id = %project.id,
            decision_id = %decision.id,
            decision_type = decision.decision_type.label(),
            score_impact = decision.score_impact,
            current_score = project.current_score(),
            risk_level = project.current_risk_level().label(),
            "decision recorded"
        );
        if decision.score_impact < 0 {
            warn!(
                project_id = %project.id,
                decision_id = %decision.id,
                "decision lacks written validation or proof"
            );
        }

        Ok(DecisionReceipt {
            decision,
            project: project.view(),
        })
    }

    pub fn add_company(
        &self,
        project_id: &ProjectId,
        draft: CompanyDraft,
    ) -> Result<Company, ProjectServiceError> {
        require_text(&draft.name, "company name")?;
        require_amount(draft.contract_amount, "contract amount")?;

        let (company, _) = self.modify(project_id, |project| {
            let company = Company {
                id: CompanyId(next_id("cmp")),
                name: draft.name,
                trade: draft.trade,
                contract_amount: draft.contract_amount,
            };
            project.companies.push(company.clone());
            Ok(company)
        })?;

        debug!(project_id = %project_id, company_id = %company.id, "company registered");
        Ok(company)
    }

    pub fn add_site_report(
        &self,
        project_id: &ProjectId,
        draft: SiteReportDraft,
    ) -> Result<SiteReport, ProjectServiceError> {
        require_text(&draft.observations, "site report observations")?;

        let (report, _) = self.modify(project_id, |project| {
            let report = SiteReport {
                id: SiteReportId(next_id("vis")),
                visited_on: draft.visited_on,
                attendees: draft.attendees,
                observations: draft.observations,
                weather: draft.weather,
            };
            project.site_reports.push(report.clone());
            Ok(report)
        })?;

        debug!(project_id = %project_id, report_id = %report.id, "site report recorded");
        Ok(report)
    }

    pub fn add_snag(
        &self,
        project_id: &ProjectId,
        draft: SnagDraft,
    ) -> Result<Snag, ProjectServiceError> {
        require_text(&draft.description, "snag description")?;

        let (snag, _) = self.modify(project_id, |project| {
            if let Some(company_id) = &draft.company_id {
                require_company(project, company_id)?;
            }
            let snag = Snag {
                id: SnagId(next_id("snag")),
                description: draft.description,
                location: draft.location,
                company_id: draft.company_id,
                reported_on: draft.reported_on,
                status: SnagStatus::Open,
                cleared_on: None,
            };
            project.snags.push(snag.clone());
            Ok(snag)
        })?;

        debug!(project_id = %project_id, snag_id = %snag.id, "snag opened");
        Ok(snag)
    }

    /// Flip a snag between open and cleared.
    pub fn toggle_snag(
        &self,
        project_id: &ProjectId,
        snag_id: &SnagId,
        today: NaiveDate,
    ) -> Result<Snag, ProjectServiceError> {
        let (snag, _) = self.modify(project_id, |project| {
            let snag = project
                .snag_mut(snag_id)
                .ok_or_else(|| ProjectServiceError::UnknownSnag(snag_id.clone()))?;
            snag.toggle(today);
            Ok(snag.clone())
        })?;

        info!(
            project_id = %project_id,
            snag_id = %snag.id,
            status = snag.status.label(),
            "snag toggled"
        );
        Ok(snag)
    }

    pub fn add_payment_application(
        &self,
        project_id: &ProjectId,
        draft: PaymentApplicationDraft,
    ) -> Result<PaymentApplication, ProjectServiceError> {
        require_amount(draft.validated_amount, "validated amount")?;

        let (payment, _) = self.modify(project_id, |project| {
            require_company(project, &draft.company_id)?;
            let duplicate = project.payment_applications.iter().any(|existing| {
                existing.company_id == draft.company_id && existing.number == draft.number
            });
            if duplicate {
                return Err(ProjectServiceError::DuplicatePaymentNumber {
                    company_id: draft.company_id,
                    number: draft.number,
                });
            }

            let payment = PaymentApplication {
                id: PaymentId(next_id("pay")),
                company_id: draft.company_id,
                number: draft.number,
                period_end: draft.period_end,
                validated_amount: draft.validated_amount,
                has_retenue_garantie: draft.has_retenue_garantie,
                status: PaymentStatus::Draft,
            };
            project.payment_applications.push(payment.clone());
            Ok(payment)
        })?;

        debug!(
            project_id = %project_id,
            payment_id = %payment.id,
            number = payment.number,
            "payment application recorded"
        );
        Ok(payment)
    }

    /// Move a payment application along `draft → submitted → validated|rejected`, `validated → paid`.
    pub fn transition_payment(
        &self,
        project_id: &ProjectId,
        payment_id: &PaymentId,
        next: PaymentStatus,
    ) -> Result<PaymentApplication, ProjectServiceError> {
        let (payment, _) = self.modify(project_id, |project| {
            let payment = project
                .payment_mut(payment_id)
                .ok_or_else(|| ProjectServiceError::UnknownPayment(payment_id.clone()))?;
            if !payment.status.can_transition_to(next) {
                return Err(ProjectServiceError::InvalidPaymentTransition {
                    from: payment.status,
                    to: next,
                });
            }
            payment.status = next;
            Ok(payment.clone())
        })?;

        info!(
            project_id = %project_id,
            payment_id = %payment.id,
            status = payment.status.label(),
            "payment application status changed"
        );
        Ok(payment)
    }

    pub fn financial_progress(
        &self,
        project_id: &ProjectId,
    ) -> Result<FinancialProgress, ProjectServiceError> {
        let project = self.get(project_id)?;
        Ok(FinancialProgress::for_project(&project))
    }

    pub fn score_timeline(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<ScorePoint>, ProjectServiceError> {
        let project = self.get(project_id)?;
        Ok(scoring::score_timeline(
            project.initial_score(),
            project.decisions(),
        ))
    }

    pub fn problematic_decisions(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Decision>, ProjectServiceError> {
        let project = self.get(project_id)?;
        Ok(scoring::problematic_decisions(project.decisions())
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn positive_decisions(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Decision>, ProjectServiceError> {
        let project = self.get(project_id)?;
        Ok(scoring::positive_decisions(project.decisions())
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn initial_score_breakdown(
        &self,
        project_id: &ProjectId,
    ) -> Result<InitialScoreBreakdown, ProjectServiceError> {
        let project = self.get(project_id)?;
        Ok(scoring::calibration_breakdown(
            project.project_type,
            project.calibration(),
        ))
    }

    pub fn dashboard(&self) -> Result<PortfolioSummary, ProjectServiceError> {
        let projects = self.repository.list()?;
        Ok(PortfolioSummary::from_projects(&projects))
    }

    fn modify<T>(
        &self,
        project_id: &ProjectId,
        apply: impl FnOnce(&mut Project) -> Result<T, ProjectServiceError>,
    ) -> Result<(T, Project), ProjectServiceError> {
        let mut project = self.get(project_id)?;
        let value = apply(&mut project)?;
        let stored = self.repository.update(project)?;
        Ok((value, stored))
    }
}

/// Preview the initial score of a calibration without storing anything.
pub fn preview_initial_score(
    project_type: ProjectType,
    calibration: &ProjectCalibration,
) -> InitialScoreBreakdown {
    scoring::calibration_breakdown(project_type, calibration)
}

fn require_text(value: &str, field: &'static str) -> Result<(), ProjectServiceError> {
    if value.trim().is_empty() {
        return Err(ProjectServiceError::Invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_finite(value: f64, field: &'static str) -> Result<(), ProjectServiceError> {
    if !value.is_finite() {
        return Err(ProjectServiceError::Invalid(format!("{field} must be a finite number")));
    }
    Ok(())
}

fn require_amount(value: f64, field: &'static str) -> Result<(), ProjectServiceError> {
    require_finite(value, field)?;
    if value < 0.0 {
        return Err(ProjectServiceError::Invalid(format!("{field} must not be negative")));
    }
    Ok(())
}

fn require_company(project: &Project, company_id: &CompanyId) -> Result<(), ProjectServiceError> {
    project
        .company(company_id)
        .map(|_| ())
        .ok_or_else(|| ProjectServiceError::UnknownCompany(company_id.clone()))
}

/// Error raised by the project service.
#[derive(Debug, thiserror::Error)]
pub enum ProjectServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("company {0} is not registered on this project")]
    UnknownCompany(CompanyId),
    #[error("snag {0} not found on this project")]
    UnknownSnag(SnagId),
    #[error("payment application {0} not found on this project")]
    UnknownPayment(PaymentId),
    #[error("payment application #{number} already exists for company {company_id}")]
    DuplicatePaymentNumber { company_id: CompanyId, number: u32 },
    #[error("payment application cannot move from {from} to {to}")]
    InvalidPaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}
