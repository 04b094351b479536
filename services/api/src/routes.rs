use crate::infra::AppState;
use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use ghr_impact::workflows::positions::{positions_router, ReconciliationEngine};
use ghr_impact::workflows::settings::{
    settings_router, ChangeRepository, HistoryRepository, MappingRepository, SettingsService,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct PasswordRequest {
    #[serde(default)]
    pub(crate) password: String,
}

/// Full dashboard surface: positions, settings, UI config and health checks. Expects an
/// `Extension<AppState>` layer.
pub(crate) fn with_dashboard_routes<R>(
    engine: Arc<ReconciliationEngine>,
    settings: Arc<SettingsService<R>>,
) -> axum::Router
where
    R: MappingRepository + HistoryRepository + ChangeRepository + 'static,
{
    positions_router(engine)
        .merge(settings_router(settings))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/config", axum::routing::get(ui_config_endpoint))
        .route(
            "/api/validate-password",
            axum::routing::post(validate_password_endpoint),
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

pub(crate) async fn ui_config_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    Json(json!({ "defaultMargin": state.ui.default_margin }))
}

pub(crate) async fn validate_password_endpoint(
    Extension(state): Extension<AppState>,
    payload: Result<Json<PasswordRequest>, JsonRejection>,
) -> impl IntoResponse {
    match payload {
        Ok(Json(request)) => {
            let valid = request.password == state.ui.privacy_password;
            info!(valid, "privacy password checked");
            (StatusCode::OK, Json(json!({ "valid": valid })))
        }
        Err(rejection) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "valid": false, "error": rejection.body_text() })),
        ),
    }
}
