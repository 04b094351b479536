use ghr_impact::config::{PositionsBackend, UiConfig};
use ghr_impact::store::{CsvRowStore, RowStore, SqliteRowStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) ui: Arc<UiConfig>,
}

/// Opens the configured positions source. Nothing is read until the first request.
pub(crate) fn position_store(backend: &PositionsBackend) -> Arc<dyn RowStore> {
    match backend {
        PositionsBackend::Sqlite(path) => Arc::new(SqliteRowStore::new(path)),
        PositionsBackend::Csv(dir) => Arc::new(CsvRowStore::new(dir)),
    }
}

pub(crate) fn describe_backend(backend: &PositionsBackend) -> String {
    match backend {
        PositionsBackend::Sqlite(path) => format!("sqlite:{}", path.display()),
        PositionsBackend::Csv(dir) => format!("csv:{}", dir.display()),
    }
}
