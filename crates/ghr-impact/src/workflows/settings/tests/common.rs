use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use axum::response::Response;
use serde_json::{json, Value};

use crate::workflows::settings::{
    ChangeRecord, ChangeRepository, HistoryRepository, HistorySnapshot, InMemorySettingsStore,
    MappingRepository, NewSnapshot, RepositoryError, SettingsService, StoredMapping,
    SystemMapping,
};

pub(super) fn build_service() -> (
    Arc<SettingsService<InMemorySettingsStore>>,
    InMemorySettingsStore,
) {
    let store = InMemorySettingsStore::default();
    let service = Arc::new(SettingsService::new(Arc::new(store.clone())));
    (service, store)
}

pub(super) fn snapshot_body(minute: u32, change_count: i64) -> Value {
    json!({
        "timestamp": format!("2025-12-05T{:02}:{:02}:00Z", 8 + minute / 60, minute % 60),
        "changeCount": change_count,
        "data": { "minute": minute }
    })
}

pub(super) fn change_body(id: &str, timestamp: &str) -> Value {
    json!({
        "id": id,
        "timestamp": timestamp,
        "jobId": "48213",
        "type": "margin",
        "data": { "from": 25, "to": 28 },
        "user": "dana"
    })
}

/// Delegates to an in-memory store and remembers which thread served each call.
#[derive(Debug, Default, Clone)]
pub(super) struct ThreadRecordingStore {
    inner: InMemorySettingsStore,
    threads: Arc<Mutex<Vec<ThreadId>>>,
}

impl ThreadRecordingStore {
    fn record(&self) {
        self.threads
            .lock()
            .expect("thread log")
            .push(thread::current().id());
    }

    pub(super) fn threads(&self) -> Vec<ThreadId> {
        self.threads.lock().expect("thread log").clone()
    }
}

impl MappingRepository for ThreadRecordingStore {
    fn replace_all(&self, mappings: &[SystemMapping]) -> Result<(), RepositoryError> {
        self.record();
        MappingRepository::replace_all(&self.inner, mappings)
    }

    fn list(&self) -> Result<Vec<StoredMapping>, RepositoryError> {
        self.record();
        MappingRepository::list(&self.inner)
    }
}

impl HistoryRepository for ThreadRecordingStore {
    fn append(&self, snapshot: &NewSnapshot, retain: usize) -> Result<i64, RepositoryError> {
        self.record();
        self.inner.append(snapshot, retain)
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistorySnapshot>, RepositoryError> {
        self.record();
        self.inner.recent(limit)
    }
}

impl ChangeRepository for ThreadRecordingStore {
    fn insert(&self, change: &ChangeRecord) -> Result<(), RepositoryError> {
        self.record();
        ChangeRepository::insert(&self.inner, change)
    }

    fn list(&self) -> Result<Vec<ChangeRecord>, RepositoryError> {
        self.record();
        ChangeRepository::list(&self.inner)
    }
}

/// Every call fails, as a store whose database file cannot be opened would.
pub(super) struct UnavailableStore;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

impl MappingRepository for UnavailableStore {
    fn replace_all(&self, _mappings: &[SystemMapping]) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn list(&self) -> Result<Vec<StoredMapping>, RepositoryError> {
        Err(offline())
    }
}

impl HistoryRepository for UnavailableStore {
    fn append(&self, _snapshot: &NewSnapshot, _retain: usize) -> Result<i64, RepositoryError> {
        Err(RepositoryError::Transaction("disk I/O error".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<HistorySnapshot>, RepositoryError> {
        Err(offline())
    }
}

impl ChangeRepository for UnavailableStore {
    fn insert(&self, _change: &ChangeRecord) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn list(&self) -> Result<Vec<ChangeRecord>, RepositoryError> {
        Err(offline())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    body: &Value,
) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize body"),
        ))
        .expect("request")
}

pub(super) fn get_request(uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::get(uri)
        .body(axum::body::Body::empty())
        .expect("request")
}
