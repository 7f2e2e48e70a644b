//! Pure computation engine for deterministic settlement logic.
//!
//! The lifecycle planner validates transitions and the payout module splits
//! escrowed funds; neither performs I/O. The order service applies the
//! resulting plans atomically.

use thiserror::Error;

pub mod fees;
pub mod lifecycle;
pub mod payout;

pub use fees::{FeeRateError, FeeSchedule, DENOM};
pub use lifecycle::{
    is_expirable, plan_accept, plan_execute, plan_expire, plan_revoke, plan_settle,
    validate_create, CreateOrderRequest,
};
pub use payout::{expiry_breakdown, settlement_breakdown, ExpiryBreakdown, SettlementBreakdown};

/// Illegal-transition and validation rejections.
///
/// Every variant is a local-abort: the order, store, and ledger are left
/// exactly as they were before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Malformed time bounds at creation.
    #[error("invalid execution window")]
    InvalidWindow,
    /// Escrow arithmetic does not fit in the amount type.
    #[error("escrow amount overflows")]
    AmountOverflow,
    /// Acceptance attempted on an order that is not in `Created`.
    #[error("order already accepted")]
    AlreadyAccepted,
    /// Operation requires a recorded executor/execution and there is none.
    #[error("order not accepted")]
    NotAccepted,
    /// Caller is not the recorded executor.
    #[error("caller is not the order executor")]
    NotExecutor,
    /// Order is not revokable, or is past `Created`.
    #[error("order not revokable")]
    NotRevokable,
    /// Outside the acceptance/execution time bounds.
    #[error("execution window closed")]
    WindowClosed,
    /// Gas accumulation would exceed `max_gas`.
    #[error("gas ceiling exceeded")]
    GasExceeded,
}
