//! Order record: the escrowed unit of work and its lifecycle status.

use crate::domain::{Address, OrderId, Timestamp};
use serde::{Deserialize, Serialize};

/// Gas prices are quoted per this many gas units, in token base units.
/// A basis of 1 means `gas_price` is the cost of a single gas unit.
pub const GAS_AMOUNT_UNIT_BASIS: i64 = 1;

/// A flat payment: an amount of some token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Amount in token base units.
    pub amount: i64,
    /// Token contract address.
    pub token: Address,
}

/// A gas-denominated payment: a price per `GAS_AMOUNT_UNIT_BASIS` gas units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPricing {
    /// Price per gas unit basis, in token base units.
    pub gas_price: i64,
    /// Token contract address.
    pub token: Address,
}

/// Lifecycle status of an order.
///
/// Legal transitions: `Created -> Accepted -> Executing -> Completed`, with
/// side exits `Created -> Revoked` (revokable orders only) and
/// `Accepted | Executing -> Expired` (deadline passed without settlement).
/// `Completed`, `Revoked`, and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Accepted,
    Executing,
    Completed,
    Revoked,
    Expired,
}

impl OrderStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Revoked | OrderStatus::Expired
        )
    }

    /// Stable string form used in the database and API.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Executing => "executing",
            OrderStatus::Completed => "completed",
            OrderStatus::Revoked => "revoked",
            OrderStatus::Expired => "expired",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(OrderStatus::Created),
            "accepted" => Ok(OrderStatus::Accepted),
            "executing" => Ok(OrderStatus::Executing),
            "completed" => Ok(OrderStatus::Completed),
            "revoked" => Ok(OrderStatus::Revoked),
            "expired" => Ok(OrderStatus::Expired),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An order offering `reward` plus gas reimbursement for a bounded,
/// gas-metered action, with the executor bonded by `guarantee`.
///
/// Identity and economic terms are immutable after creation; only `status`,
/// `gas_balance`, `executor`, and `accepted_at` are mutated by the lifecycle
/// engine. Terminal orders are retained for audit and query, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Manager posting the order and funding its escrow.
    pub creator: Address,
    /// Fee-schedule index this order was created under.
    pub order_type: u8,
    pub status: OrderStatus,
    /// Ceiling on billable gas units.
    pub max_gas: i64,
    /// Start of the legal acceptance/execution period.
    pub execution_period_start: Timestamp,
    /// End of the legal acceptance/execution period.
    pub execution_period_deadline: Timestamp,
    /// Seconds an executor has to complete after acceptance.
    pub execution_window: i64,
    /// If false, `revoke` is permanently unavailable.
    pub is_revokable: bool,
    /// Payment owed to the executor on settlement; escrowed at creation.
    pub reward: TokenAmount,
    /// Gas reimbursement reserve; escrowed at creation.
    pub gas_cost: GasPricing,
    /// Deposit the executor locks at acceptance.
    pub guarantee: GasPricing,
    /// Gas consumed so far; monotonically non-decreasing, `<= max_gas`.
    pub gas_balance: i64,
    /// Fee rate over `DENOM`, snapshotted from the fee schedule at creation.
    pub fee_rate: i64,
    /// Recorded at acceptance.
    pub executor: Option<Address>,
    /// Acceptance time; starts the execution-window timer.
    pub accepted_at: Option<Timestamp>,
}

impl Order {
    /// Worst-case gas reimbursement reserved at creation.
    pub fn gas_escrow(&self) -> Option<i64> {
        self.max_gas
            .checked_mul(self.gas_cost.gas_price)
            .map(|v| v / GAS_AMOUNT_UNIT_BASIS)
    }

    /// Total amount pulled from the creator at creation.
    pub fn creator_escrow(&self) -> Option<i64> {
        self.reward.amount.checked_add(self.gas_escrow()?)
    }

    /// End of the execution window; `None` before acceptance.
    pub fn execution_window_end(&self) -> Option<Timestamp> {
        self.accepted_at.map(|t| t.plus(self.execution_window))
    }
}
