use crate::cli::ServeArgs;
use crate::infra::{build_service, load_profile, AppState};
use crate::routes::with_operational_routes;
use admission_fit::config::AppConfig;
use admission_fit::error::AppError;
use admission_fit::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let profile = load_profile(config.scoring.profile_path.as_deref())?;
    let program = profile.program.clone();
    let service = build_service(profile, &config.narrative)?;

    let app = with_operational_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        %program,
        narrative = config.narrative.enabled(),
        "admission fit service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
