use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFeeRequest {
    pub rate: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeResponse {
    pub order_type: u8,
    pub rate: i64,
}

/// Update the fee rate charged on future orders of `order_type`. Orders
/// already created keep the rate snapshotted at creation.
pub async fn set_fee(
    Path(order_type): Path<u8>,
    State(state): State<AppState>,
    Json(req): Json<SetFeeRequest>,
) -> Result<Json<FeeResponse>, AppError> {
    state.service.set_fee(order_type, req.rate).await?;
    Ok(Json(FeeResponse {
        order_type,
        rate: req.rate,
    }))
}

pub async fn get_fee(
    Path(order_type): Path<u8>,
    State(state): State<AppState>,
) -> Result<Json<FeeResponse>, AppError> {
    let rate = state.service.fee_rate(order_type).await;
    Ok(Json(FeeResponse { order_type, rate }))
}
