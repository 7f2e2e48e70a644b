use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Readiness: the order service is up and its database answers.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match state.service.ready().await {
        Ok(()) => Ok(Json(serde_json::json!({"status": "ready"}))),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
