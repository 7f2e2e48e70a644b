use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_address, parse_amount, AppState};
use crate::domain::{
    EventRecord, GasPricing, Order, OrderFilter, OrderId, OrderStatus, OrderView, Timestamp,
    TokenAmount,
};
use crate::engine::CreateOrderRequest;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderDto {
    pub creator: String,
    pub order_type: u8,
    pub max_gas: u64,
    pub execution_period_start: i64,
    pub execution_period_deadline: i64,
    pub execution_window: i64,
    pub is_revokable: bool,
    pub reward_amount: u64,
    pub reward_token: String,
    pub gas_cost_price: u64,
    pub gas_cost_token: String,
    pub guarantee_amount: u64,
    pub guarantee_token: String,
}

impl CreateOrderDto {
    fn into_request(self) -> Result<CreateOrderRequest, AppError> {
        if self.max_gas == 0 {
            return Err(AppError::BadRequest("maxGas must be positive".to_string()));
        }
        Ok(CreateOrderRequest {
            creator: parse_address(&self.creator, "creator")?,
            order_type: self.order_type,
            max_gas: parse_amount(self.max_gas, "maxGas")?,
            execution_period_start: Timestamp::new(self.execution_period_start),
            execution_period_deadline: Timestamp::new(self.execution_period_deadline),
            execution_window: self.execution_window,
            is_revokable: self.is_revokable,
            reward: TokenAmount {
                amount: parse_amount(self.reward_amount, "rewardAmount")?,
                token: parse_address(&self.reward_token, "rewardToken")?,
            },
            gas_cost: GasPricing {
                gas_price: parse_amount(self.gas_cost_price, "gasCostPrice")?,
                token: parse_address(&self.gas_cost_token, "gasCostToken")?,
            },
            guarantee: GasPricing {
                gas_price: parse_amount(self.guarantee_amount, "guaranteeAmount")?,
                token: parse_address(&self.guarantee_token, "guaranteeToken")?,
            },
        })
    }
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(dto): Json<CreateOrderDto>,
) -> Result<Json<OrderView>, AppError> {
    let request = dto.into_request()?;
    let view = state.service.create_order(request).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub manager: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersResponse {
    pub orders: Vec<OrderView>,
}

pub async fn get_orders(
    Query(params): Query<OrdersQuery>,
    State(state): State<AppState>,
) -> Result<Json<OrdersResponse>, AppError> {
    let manager = match params.manager.as_deref() {
        Some("") | None => None,
        Some(raw) => Some(parse_address(raw, "manager")?),
    };
    let status = match params.status.as_deref() {
        Some("") | None => None,
        Some(raw) => Some(raw.parse::<OrderStatus>().map_err(AppError::BadRequest)?),
    };

    let filter = OrderFilter {
        manager,
        status,
        limit: params.limit,
        offset: params.offset.unwrap_or(0),
    };
    let orders = state.service.filtered_orders(&filter).await;
    Ok(Json(OrdersResponse { orders }))
}

pub async fn get_order(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Order>, AppError> {
    let order = state.service.get_order(OrderId::new(id)).await?;
    Ok(Json(order))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub events: Vec<EventRecord>,
}

pub async fn get_order_events(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<EventsResponse>, AppError> {
    let events = state.service.order_events(OrderId::new(id)).await?;
    Ok(Json(EventsResponse { events }))
}
