use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use evidence_engine::config::AppConfig;
use evidence_engine::error::AppError;
use evidence_engine::telemetry;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{build_engine, load_store, AnalysisState, AppState};
use crate::routes::analysis_routes;

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

    let engine = build_engine(&config.analysis);
    let store = load_store(&config.analysis)?;
    let analysis_state = AnalysisState::new(engine, store);

    let app = analysis_routes()
        .layer(Extension(analysis_state))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "evidence engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
