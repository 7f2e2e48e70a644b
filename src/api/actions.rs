//! Lifecycle transition endpoints. Each handler delegates to the order
//! service, which serializes transitions and owns all fund movements.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use super::{parse_address, parse_amount, AppState};
use crate::domain::{OrderId, OrderView};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRequest {
    pub executor: String,
}

pub async fn accept(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<AcceptRequest>,
) -> Result<Json<OrderView>, AppError> {
    let executor = parse_address(&req.executor, "executor")?;
    let view = state.service.accept(OrderId::new(id), executor).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub executor: String,
    pub gas_used: u64,
}

pub async fn execute(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<OrderView>, AppError> {
    let executor = parse_address(&req.executor, "executor")?;
    let gas_used = parse_amount(req.gas_used, "gasUsed")?;
    if gas_used == 0 {
        return Err(AppError::BadRequest("gasUsed must be positive".to_string()));
    }
    let view = state
        .service
        .execute(OrderId::new(id), executor, gas_used)
        .await?;
    Ok(Json(view))
}

pub async fn settle(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<OrderView>, AppError> {
    let view = state.service.settle(OrderId::new(id)).await?;
    Ok(Json(view))
}

pub async fn revoke(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<OrderView>, AppError> {
    let view = state.service.revoke(OrderId::new(id)).await?;
    Ok(Json(view))
}

pub async fn expire(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<OrderView>, AppError> {
    let view = state.service.expire(OrderId::new(id)).await?;
    Ok(Json(view))
}
