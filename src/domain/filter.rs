//! Typed query filter and the read-model view it produces.

use crate::domain::{Address, Order, OrderId, OrderStatus, Timestamp};
use serde::{Deserialize, Serialize};

/// Hard cap on entries returned per query page.
pub const MAX_PAGE_SIZE: usize = 100;

/// Filter for scanning the order store.
///
/// Explicit sentinels instead of ad hoc nullable parameters: a `manager` of
/// `None` (or the zero address at the API boundary) matches every creator,
/// and a `status` of `None` matches every status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderFilter {
    pub manager: Option<Address>,
    pub status: Option<OrderStatus>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl OrderFilter {
    /// Whether the given order passes the manager and status predicates.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(manager) = &self.manager {
            if !manager.is_zero() && *manager != order.creator {
                return false;
            }
        }
        if let Some(status) = self.status {
            if status != order.status {
                return false;
            }
        }
        true
    }

    /// Effective page size after clamping to [`MAX_PAGE_SIZE`].
    pub fn page_size(&self) -> usize {
        self.limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }
}

/// Read-only projection of an order for clients, surfacing `gas_balance`
/// alongside the stored fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub creator: Address,
    pub order_type: u8,
    pub status: OrderStatus,
    pub max_gas: i64,
    pub execution_period_start: Timestamp,
    pub execution_period_deadline: Timestamp,
    pub execution_window: i64,
    pub is_revokable: bool,
    pub reward_amount: i64,
    pub reward_token: Address,
    pub gas_cost_price: i64,
    pub gas_cost_token: Address,
    pub guarantee_amount: i64,
    pub guarantee_token: Address,
    pub gas_balance: i64,
    pub executor: Option<Address>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        OrderView {
            id: order.id,
            creator: order.creator.clone(),
            order_type: order.order_type,
            status: order.status,
            max_gas: order.max_gas,
            execution_period_start: order.execution_period_start,
            execution_period_deadline: order.execution_period_deadline,
            execution_window: order.execution_window,
            is_revokable: order.is_revokable,
            reward_amount: order.reward.amount,
            reward_token: order.reward.token.clone(),
            gas_cost_price: order.gas_cost.gas_price,
            gas_cost_token: order.gas_cost.token.clone(),
            guarantee_amount: order.guarantee.gas_price,
            guarantee_token: order.guarantee.token.clone(),
            gas_balance: order.gas_balance,
            executor: order.executor.clone(),
        }
    }
}
