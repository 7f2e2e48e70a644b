pub mod actions;
pub mod fees;
pub mod health;
pub mod orders;

use crate::error::AppError;
use crate::domain::Address;
use crate::service::OrderService;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OrderService>,
}

impl AppState {
    pub fn new(service: Arc<OrderService>) -> Self {
        Self { service }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/orders", post(orders::create_order))
        .route("/v1/orders", get(orders::get_orders))
        .route("/v1/orders/:id", get(orders::get_order))
        .route("/v1/orders/:id/events", get(orders::get_order_events))
        .route("/v1/orders/:id/accept", post(actions::accept))
        .route("/v1/orders/:id/execute", post(actions::execute))
        .route("/v1/orders/:id/settle", post(actions::settle))
        .route("/v1/orders/:id/revoke", post(actions::revoke))
        .route("/v1/orders/:id/expire", post(actions::expire))
        .route("/v1/fees/:order_type", put(fees::set_fee))
        .route("/v1/fees/:order_type", get(fees::get_fee))
        .layer(cors)
        .with_state(state)
}

/// Parse a 0x-prefixed hex account address.
pub(crate) fn parse_address(raw: &str, field: &str) -> Result<Address, AppError> {
    if !raw.starts_with("0x") {
        return Err(AppError::BadRequest(format!("Invalid {} address", field)));
    }
    let hex_part = &raw[2..];
    if hex_part.is_empty() || hex_part.len() > 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(AppError::BadRequest(format!("Invalid {} address", field)));
    }
    Ok(Address::new(raw.to_string()))
}

/// Parse a non-negative token amount into the engine's i64 base units.
pub(crate) fn parse_amount(raw: u64, field: &str) -> Result<i64, AppError> {
    i64::try_from(raw)
        .map_err(|_| AppError::BadRequest(format!("Value of {} is out of range", field)))
}
