use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::EngineError;
use crate::service::ServiceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Service(err) => (service_status(&err), err.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// HTTP mapping for the engine's error taxonomy. Illegal transitions are
/// conflicts (state unchanged), funding shortfalls are payment failures,
/// malformed inputs are bad requests.
fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Engine(engine) => match engine {
            EngineError::InvalidWindow | EngineError::AmountOverflow => StatusCode::BAD_REQUEST,
            EngineError::NotExecutor => StatusCode::FORBIDDEN,
            EngineError::AlreadyAccepted
            | EngineError::NotAccepted
            | EngineError::NotRevokable
            | EngineError::WindowClosed
            | EngineError::GasExceeded => StatusCode::CONFLICT,
        },
        ServiceError::Ledger(_) => StatusCode::PAYMENT_REQUIRED,
        ServiceError::TokenMismatch | ServiceError::FeeRate(_) => StatusCode::BAD_REQUEST,
        ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
