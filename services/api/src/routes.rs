use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chantier_trace::projects::{
    preview_initial_score, project_router, InitialScoreBreakdown, ProjectCalibration,
    ProjectRepository, ProjectService, ProjectType,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct CalibrationPreviewRequest {
    pub(crate) project_type: ProjectType,
    pub(crate) calibration: ProjectCalibration,
}

pub(crate) fn with_project_routes<R>(service: Arc<ProjectService<R>>) -> axum::Router
where
    R: ProjectRepository + 'static,
{
    project_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/calibration/preview",
            axum::routing::post(calibration_preview_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Score a questionnaire without registering a project.
pub(crate) async fn calibration_preview_endpoint(
    Json(payload): Json<CalibrationPreviewRequest>,
) -> Json<InitialScoreBreakdown> {
    Json(preview_initial_score(
        payload.project_type,
        &payload.calibration,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryProjectRepository;
    use axum::body::Body;
    use axum::http::Request;
    use chantier_trace::projects::{CalibrationAnswer, OngoingProjectCalibration, RiskLevel};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    #[tokio::test]
    async fn calibration_preview_scores_without_storing() {
        let request = CalibrationPreviewRequest {
            project_type: ProjectType::Individual,
            calibration: ProjectCalibration::Ongoing(OngoingProjectCalibration::uniform(
                CalibrationAnswer::Yes,
            )),
        };

        let Json(breakdown) = calibration_preview_endpoint(Json(request)).await;

        // 50 + 4 + 3 + 3 + 3 + 2 + 4 + 3
        assert_eq!(breakdown.raw_total, 72);
        assert_eq!(breakdown.score, 72);
        assert_eq!(breakdown.risk_level, RiskLevel::Medium);
        assert_eq!(breakdown.components.len(), 7);
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let state = app_state(false);
        let response = readiness_endpoint(Extension(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn probes_are_mounted_next_to_project_routes() {
        let service = Arc::new(ProjectService::new(Arc::new(
            InMemoryProjectRepository::default(),
        )));
        let app = with_project_routes(service).layer(Extension(app_state(true)));

        for uri in ["/health", "/ready", "/metrics", "/api/v1/dashboard"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }
}
