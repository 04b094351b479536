use crate::cli::ServeArgs;
use crate::infra::{describe_backend, position_store, AppState};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use ghr_impact::config::AppConfig;
use ghr_impact::error::AppError;
use ghr_impact::telemetry;
use ghr_impact::workflows::positions::ReconciliationEngine;
use ghr_impact::workflows::settings::{SettingsService, SqliteSettingsStore};
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        ui: Arc::new(config.ui.clone()),
    };

    let engine = Arc::new(ReconciliationEngine::standard(position_store(
        &config.stores.positions,
    )));
    let settings = Arc::new(SettingsService::new(Arc::new(SqliteSettingsStore::new(
        &config.stores.changes_db,
    ))));

    let app = with_dashboard_routes(engine, settings)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        positions = %describe_backend(&config.stores.positions),
        changes_db = %config.stores.changes_db.display(),
        "ghr impact service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
