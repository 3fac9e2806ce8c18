use crate::cli::ServeArgs;
use crate::demo::seed_demo_project;
use crate::infra::{AppState, InMemoryProjectRepository};
use crate::routes::with_project_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chantier_trace::config::AppConfig;
use chantier_trace::error::AppError;
use chantier_trace::projects::ProjectService;
use chantier_trace::telemetry;
use chrono::Local;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if args.seed_demo {
        config.seed_demo = true;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryProjectRepository::default());
    let project_service = Arc::new(ProjectService::new(repository));

    if config.seed_demo {
        let project = seed_demo_project(project_service.as_ref(), Local::now().date_naive())?;
        info!(project_id = %project.id, "demo project seeded");
    }

    let app = with_project_routes(project_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "chantier trace service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
