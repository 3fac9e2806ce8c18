use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    CompanyDraft, DecisionDraft, PaymentApplicationDraft, PaymentId, PaymentStatus, ProjectDraft,
    ProjectId, SiteReportDraft, SnagDraft, SnagId,
};
use super::repository::{ProjectRepository, RepositoryError};
use super::service::{ProjectService, ProjectServiceError};

type SharedService<R> = State<Arc<ProjectService<R>>>;

/// Body of a payment status change.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaymentTransitionRequest {
    pub status: PaymentStatus,
}

/// Router builder exposing the project traceability endpoints.
pub fn project_router<R>(service: Arc<ProjectService<R>>) -> Router
where
    R: ProjectRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/projects",
            get(list_projects_handler::<R>).post(create_project_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id",
            get(project_handler::<R>).delete(delete_project_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/decisions",
            post(add_decision_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/decisions/problematic",
            get(problematic_decisions_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/decisions/positive",
            get(positive_decisions_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/score/timeline",
            get(score_timeline_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/score/breakdown",
            get(score_breakdown_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/companies",
            post(add_company_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/site-reports",
            post(add_site_report_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/snags",
            post(add_snag_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/snags/:snag_id/toggle",
            post(toggle_snag_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/payments",
            post(add_payment_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/payments/:payment_id/status",
            post(transition_payment_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/finance",
            get(finance_handler::<R>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<R>))
        .with_state(service)
}

pub(crate) fn error_response(error: ProjectServiceError) -> Response {
    let status = match &error {
        ProjectServiceError::Repository(RepositoryError::NotFound)
        | ProjectServiceError::UnknownSnag(_)
        | ProjectServiceError::UnknownPayment(_) => StatusCode::NOT_FOUND,
        ProjectServiceError::Repository(RepositoryError::Conflict)
        | ProjectServiceError::DuplicatePaymentNumber { .. } => StatusCode::CONFLICT,
        ProjectServiceError::Invalid(_)
        | ProjectServiceError::UnknownCompany(_)
        | ProjectServiceError::InvalidPaymentTransition { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ProjectServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn respond<T>(status: StatusCode, result: Result<T, ProjectServiceError>) -> Response
where
    T: serde::Serialize,
{
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_project_handler<R>(
    State(service): SharedService<R>,
    Json(draft): Json<ProjectDraft>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.create_project(draft).map(|project| project.view()),
    )
}

pub(crate) async fn list_projects_handler<R>(State(service): SharedService<R>) -> Response
where
    R: ProjectRepository + 'static,
{
    let views = service
        .list()
        .map(|projects| projects.iter().map(|project| project.view()).collect::<Vec<_>>());
    respond(StatusCode::OK, views)
}

pub(crate) async fn project_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    let id = ProjectId(project_id);
    respond(StatusCode::OK, service.get(&id).map(|project| project.view()))
}

pub(crate) async fn delete_project_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.delete(&ProjectId(project_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_decision_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
    Json(draft): Json<DecisionDraft>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_decision(&ProjectId(project_id), draft),
    )
}

pub(crate) async fn problematic_decisions_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.problematic_decisions(&ProjectId(project_id)),
    )
}

pub(crate) async fn positive_decisions_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.positive_decisions(&ProjectId(project_id)),
    )
}

pub(crate) async fn score_timeline_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(StatusCode::OK, service.score_timeline(&ProjectId(project_id)))
}

pub(crate) async fn score_breakdown_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.initial_score_breakdown(&ProjectId(project_id)),
    )
}

pub(crate) async fn add_company_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
    Json(draft): Json<CompanyDraft>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_company(&ProjectId(project_id), draft),
    )
}

pub(crate) async fn add_site_report_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
    Json(draft): Json<SiteReportDraft>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_site_report(&ProjectId(project_id), draft),
    )
}

pub(crate) async fn add_snag_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
    Json(draft): Json<SnagDraft>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_snag(&ProjectId(project_id), draft),
    )
}

pub(crate) async fn toggle_snag_handler<R>(
    State(service): SharedService<R>,
    Path((project_id, snag_id)): Path<(String, String)>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    let today = Utc::now().date_naive();
    respond(
        StatusCode::OK,
        service.toggle_snag(&ProjectId(project_id), &SnagId(snag_id), today),
    )
}

pub(crate) async fn add_payment_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
    Json(draft): Json<PaymentApplicationDraft>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_payment_application(&ProjectId(project_id), draft),
    )
}

pub(crate) async fn transition_payment_handler<R>(
    State(service): SharedService<R>,
    Path((project_id, payment_id)): Path<(String, String)>,
    Json(request): Json<PaymentTransitionRequest>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.transition_payment(
            &ProjectId(project_id),
            &PaymentId(payment_id),
            request.status,
        ),
    )
}

pub(crate) async fn finance_handler<R>(
    State(service): SharedService<R>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.financial_progress(&ProjectId(project_id)),
    )
}

pub(crate) async fn dashboard_handler<R>(State(service): SharedService<R>) -> Response
where
    R: ProjectRepository + 'static,
{
    respond(StatusCode::OK, service.dashboard())
}
