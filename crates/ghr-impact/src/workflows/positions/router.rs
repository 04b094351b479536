use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Local;
use serde_json::json;
use tracing::error;

use super::engine::ReconciliationEngine;
use super::stats::placement_stats;
use crate::error::AppError;

/// Router builder exposing the reconciled positions and placement stats.
pub fn positions_router(engine: Arc<ReconciliationEngine>) -> Router {
    Router::new()
        .route("/api/positions", get(positions_handler))
        .route("/api/stats", get(stats_handler))
        .with_state(engine)
}

/// Source outages are reported inside the body; the status stays 200.
pub(crate) async fn positions_handler(State(engine): State<Arc<ReconciliationEngine>>) -> Response {
    match tokio::task::spawn_blocking(move || engine.run()).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => internal_error(err.to_string()),
    }
}

pub(crate) async fn stats_handler(State(engine): State<Arc<ReconciliationEngine>>) -> Response {
    let outcome = tokio::task::spawn_blocking(move || {
        placement_stats(engine.store(), Local::now().naive_local())
    })
    .await;

    match outcome {
        Ok(Ok(stats)) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Ok(Err(err)) => {
            error!(error = %err, "placement stats unavailable");
            AppError::from(err).into_response()
        }
        Err(err) => internal_error(err.to_string()),
    }
}

fn internal_error(message: String) -> Response {
    error!(error = %message, "positions request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({ "error": message })),
    )
        .into_response()
}
