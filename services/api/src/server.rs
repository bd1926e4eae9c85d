use crate::cli::ServeArgs;
use crate::infra::{build_review_stack, AppState};
use crate::routes::with_review_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use firesafe_review::config::AppConfig;
use firesafe_review::error::AppError;
use firesafe_review::telemetry;
use firesafe_review::workflows::review::{NotificationSink, ProjectRepository, ReviewService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Startup refresh of stored report text. Failures are logged, never fatal.
pub(crate) fn refresh_stored_reports<R, N>(service: &ReviewService<R, N>) -> usize
where
    R: ProjectRepository + 'static,
    N: NotificationSink + 'static,
{
    match service.refresh_all_reports() {
        Ok(0) => 0,
        Ok(refreshed) => {
            info!(refreshed, "stored report recommendations refreshed at startup");
            refreshed
        }
        Err(err) => {
            warn!(error = %err, "could not refresh stored report recommendations");
            0
        }
    }
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let stack = build_review_stack(&config.review)?;
    refresh_stored_reports(&stack.service);

    let app = with_review_routes(stack.service)
        .layer(Extension(stack.notifications))
        .layer(Extension(stack.analyses))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fire-safety review service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
