//! Lifecycle events emitted on every state transition.
//!
//! Events are the surface external observers (indexers, UIs) consume instead
//! of polling full order state: each carries the order id and the fields that
//! changed. They are journaled to the database and published on an in-process
//! broadcast channel.

use crate::domain::{Address, OrderId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OrderEvent {
    #[serde(rename_all = "camelCase")]
    Created {
        creator: Address,
        order_type: u8,
        escrowed: i64,
    },
    #[serde(rename_all = "camelCase")]
    Accepted {
        executor: Address,
        guarantee_locked: i64,
    },
    #[serde(rename_all = "camelCase")]
    ExecutionProgress {
        executor: Address,
        gas_used: i64,
        gas_balance: i64,
    },
    #[serde(rename_all = "camelCase")]
    Settled {
        executor: Address,
        executor_payout: i64,
        protocol_fee: i64,
        creator_refund: i64,
        guarantee_refund: i64,
    },
    #[serde(rename_all = "camelCase")]
    Revoked { creator_refund: i64 },
    #[serde(rename_all = "camelCase")]
    Expired {
        guarantee_forfeit: i64,
        creator_refund: i64,
    },
}

impl OrderEvent {
    /// Stable discriminant used for journal rows and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderEvent::Created { .. } => "created",
            OrderEvent::Accepted { .. } => "accepted",
            OrderEvent::ExecutionProgress { .. } => "executionProgress",
            OrderEvent::Settled { .. } => "settled",
            OrderEvent::Revoked { .. } => "revoked",
            OrderEvent::Expired { .. } => "expired",
        }
    }
}

/// A journaled event with its identity and position in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_id: Uuid,
    pub order_id: OrderId,
    /// Environment-clock time the transition was applied, seconds.
    pub occurred_at: i64,
    #[serde(flatten)]
    pub event: OrderEvent,
}

impl EventRecord {
    pub fn new(order_id: OrderId, occurred_at: i64, event: OrderEvent) -> Self {
        EventRecord {
            event_id: Uuid::new_v4(),
            order_id,
            occurred_at,
            event,
        }
    }
}
