use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tracing::error;

use crate::error::AppError;

use super::mappings::ReplaceMappingsRequest;
use super::repository::{
    ChangeRepository, HistoryRepository, MappingRepository, RepositoryError,
};
use super::service::{SettingsError, SettingsService};

/// Router builder exposing the mapping, history and change-log endpoints.
pub fn settings_router<R>(service: Arc<SettingsService<R>>) -> Router
where
    R: MappingRepository + HistoryRepository + ChangeRepository + 'static,
{
    Router::new()
        .route(
            "/api/system-mappings",
            get(list_mappings_handler::<R>).post(replace_mappings_handler::<R>),
        )
        .route(
            "/api/history",
            get(history_handler::<R>).post(append_history_handler::<R>),
        )
        .route(
            "/api/changes",
            get(changes_handler::<R>).post(record_change_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn list_mappings_handler<R>(
    State(service): State<Arc<SettingsService<R>>>,
) -> Response
where
    R: MappingRepository + HistoryRepository + ChangeRepository + 'static,
{
    match blocking(service, |service| service.mappings()).await {
        Ok(mappings) => {
            (StatusCode::OK, axum::Json(json!({ "mappings": mappings }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn replace_mappings_handler<R>(
    State(service): State<Arc<SettingsService<R>>>,
    axum::Json(body): axum::Json<Value>,
) -> Response
where
    R: MappingRepository + HistoryRepository + ChangeRepository + 'static,
{
    let request = match serde_json::from_value::<ReplaceMappingsRequest>(body) {
        Ok(request) => request,
        Err(err) => return error_response(SettingsError::Malformed(err.to_string())),
    };

    let outcome = blocking(service, move |service| service.replace_mappings(request)).await;
    match outcome {
        Ok(count) => (
            StatusCode::OK,
            axum::Json(json!({ "success": true, "count": count })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn history_handler<R>(State(service): State<Arc<SettingsService<R>>>) -> Response
where
    R: MappingRepository + HistoryRepository + ChangeRepository + 'static,
{
    match blocking(service, |service| service.history()).await {
        Ok(snapshots) => (StatusCode::OK, axum::Json(snapshots)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn append_history_handler<R>(
    State(service): State<Arc<SettingsService<R>>>,
    axum::Json(body): axum::Json<Value>,
) -> Response
where
    R: MappingRepository + HistoryRepository + ChangeRepository + 'static,
{
    let outcome = blocking(service, move |service| service.append_snapshot(&body)).await;
    match outcome {
        Ok(id) => (
            StatusCode::OK,
            axum::Json(json!({ "success": true, "id": id })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

/// The change log is a read path the dashboard tolerates losing, so failures degrade to
/// an empty list with the error attached.
pub(crate) async fn changes_handler<R>(State(service): State<Arc<SettingsService<R>>>) -> Response
where
    R: MappingRepository + HistoryRepository + ChangeRepository + 'static,
{
    match blocking(service, |service| service.changes()).await {
        Ok(changes) => {
            (StatusCode::OK, axum::Json(json!({ "changes": changes }))).into_response()
        }
        Err(error) => (
            StatusCode::OK,
            axum::Json(json!({ "changes": [], "error": error.to_string() })),
        )
            .into_response(),
    }
}

pub(crate) async fn record_change_handler<R>(
    State(service): State<Arc<SettingsService<R>>>,
    axum::Json(body): axum::Json<Value>,
) -> Response
where
    R: MappingRepository + HistoryRepository + ChangeRepository + 'static,
{
    let outcome = blocking(service, move |service| service.record_change(&body)).await;
    match outcome {
        Ok(_) => (StatusCode::OK, axum::Json(json!({ "success": true }))).into_response(),
        Err(error) => error_response(error),
    }
}

/// Runs a store call on the blocking pool; the SQLite repository does file I/O per call.
async fn blocking<R, T, F>(service: Arc<SettingsService<R>>, work: F) -> Result<T, SettingsError>
where
    R: MappingRepository + HistoryRepository + ChangeRepository + 'static,
    T: Send + 'static,
    F: FnOnce(&SettingsService<R>) -> Result<T, SettingsError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || work(&service)).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "settings task failed");
            Err(RepositoryError::Unavailable(err.to_string()).into())
        }
    }
}

fn error_response(error: SettingsError) -> Response {
    AppError::from(error).into_response()
}
