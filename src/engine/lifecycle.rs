//! Lifecycle transition planning.
//!
//! Every function here is pure: it inspects an order and the environment
//! clock, and either returns a plan (the fund movements and field updates
//! the caller must apply atomically) or a typed rejection that leaves state
//! untouched. I/O — ledger transfers, persistence, events — is the order
//! service's job.

use crate::domain::{Address, Order, OrderStatus, Timestamp, TokenAmount};
use crate::domain::{GasPricing, OrderId};
use crate::engine::payout::{expiry_breakdown, settlement_breakdown, ExpiryBreakdown, SettlementBreakdown};
use crate::engine::EngineError;

/// Immutable creation parameters, validated before any funds move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub creator: Address,
    pub order_type: u8,
    pub max_gas: i64,
    pub execution_period_start: Timestamp,
    pub execution_period_deadline: Timestamp,
    pub execution_window: i64,
    pub is_revokable: bool,
    pub reward: TokenAmount,
    pub gas_cost: GasPricing,
    pub guarantee: GasPricing,
}

impl CreateOrderRequest {
    /// Materialize the order record this request describes.
    pub fn into_order(self, id: OrderId, fee_rate: i64) -> Order {
        Order {
            id,
            creator: self.creator,
            order_type: self.order_type,
            status: OrderStatus::Created,
            max_gas: self.max_gas,
            execution_period_start: self.execution_period_start,
            execution_period_deadline: self.execution_period_deadline,
            execution_window: self.execution_window,
            is_revokable: self.is_revokable,
            reward: self.reward,
            gas_cost: self.gas_cost,
            guarantee: self.guarantee,
            gas_balance: 0,
            fee_rate,
            executor: None,
            accepted_at: None,
        }
    }
}

/// Validate creation time bounds and compute the creator's escrow pull.
///
/// The window invariant: `start < deadline`, `window > 0`, and the window
/// fits inside `[start, deadline]`.
pub fn validate_create(req: &CreateOrderRequest) -> Result<i64, EngineError> {
    if req.execution_period_start >= req.execution_period_deadline {
        return Err(EngineError::InvalidWindow);
    }
    if req.execution_window <= 0 {
        return Err(EngineError::InvalidWindow);
    }
    let period = req.execution_period_deadline.as_i64() - req.execution_period_start.as_i64();
    if req.execution_window > period {
        return Err(EngineError::InvalidWindow);
    }

    let gas_escrow = req
        .max_gas
        .checked_mul(req.gas_cost.gas_price)
        .ok_or(EngineError::AmountOverflow)?
        / crate::domain::GAS_AMOUNT_UNIT_BASIS;
    req.reward
        .amount
        .checked_add(gas_escrow)
        .ok_or(EngineError::AmountOverflow)
}

/// Plan acceptance: legal only from `Created`, before the period deadline.
/// Returns the guarantee amount to pull from the executor.
pub fn plan_accept(order: &Order, now: Timestamp) -> Result<i64, EngineError> {
    if order.status != OrderStatus::Created {
        return Err(EngineError::AlreadyAccepted);
    }
    if now >= order.execution_period_deadline {
        return Err(EngineError::WindowClosed);
    }
    Ok(order.guarantee.gas_price)
}

/// Plan an execution progress report: legal only for the recorded executor,
/// from `Accepted`/`Executing`, inside both the execution window and the
/// period bounds. Returns the new gas balance.
pub fn plan_execute(
    order: &Order,
    executor: &Address,
    gas_used: i64,
    now: Timestamp,
) -> Result<i64, EngineError> {
    if !matches!(order.status, OrderStatus::Accepted | OrderStatus::Executing) {
        return Err(EngineError::NotAccepted);
    }
    match &order.executor {
        Some(recorded) if recorded == executor => {}
        _ => return Err(EngineError::NotExecutor),
    }
    check_execution_timing(order, now)?;

    let new_balance = order
        .gas_balance
        .checked_add(gas_used)
        .ok_or(EngineError::GasExceeded)?;
    if new_balance > order.max_gas {
        return Err(EngineError::GasExceeded);
    }
    Ok(new_balance)
}

/// Plan settlement: legal only once execution has been recorded
/// (`Executing`) and while the window and deadline are still open.
pub fn plan_settle(order: &Order, now: Timestamp) -> Result<SettlementBreakdown, EngineError> {
    if order.status != OrderStatus::Executing {
        return Err(EngineError::NotAccepted);
    }
    check_execution_timing(order, now)?;
    settlement_breakdown(order).ok_or(EngineError::AmountOverflow)
}

/// Plan revocation: legal only from `Created` on a revokable order.
/// Returns the creator's full escrow to refund.
pub fn plan_revoke(order: &Order) -> Result<i64, EngineError> {
    if order.status != OrderStatus::Created || !order.is_revokable {
        return Err(EngineError::NotRevokable);
    }
    order.creator_escrow().ok_or(EngineError::AmountOverflow)
}

/// Plan expiry: legal from `Accepted`/`Executing` once the period deadline
/// has passed without settlement.
pub fn plan_expire(order: &Order, now: Timestamp) -> Result<ExpiryBreakdown, EngineError> {
    if !matches!(order.status, OrderStatus::Accepted | OrderStatus::Executing) {
        return Err(EngineError::NotAccepted);
    }
    if now <= order.execution_period_deadline {
        return Err(EngineError::WindowClosed);
    }
    expiry_breakdown(order).ok_or(EngineError::AmountOverflow)
}

/// Whether a lazy expiry transition is due for this order.
pub fn is_expirable(order: &Order, now: Timestamp) -> bool {
    matches!(order.status, OrderStatus::Accepted | OrderStatus::Executing)
        && now > order.execution_period_deadline
}

fn check_execution_timing(order: &Order, now: Timestamp) -> Result<(), EngineError> {
    // Acceptance is a precondition of every caller, so accepted_at is set.
    let accepted_at = order.accepted_at.ok_or(EngineError::NotAccepted)?;
    let window_end = accepted_at.plus(order.execution_window);
    if now < order.execution_period_start || now > order.execution_period_deadline {
        return Err(EngineError::WindowClosed);
    }
    if now < accepted_at || now > window_end {
        return Err(EngineError::WindowClosed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Address {
        Address::new("0xt0ken".to_string())
    }

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            creator: Address::new("0xcreator".to_string()),
            order_type: 0,
            max_gas: 20,
            execution_period_start: Timestamp::new(1_000),
            execution_period_deadline: Timestamp::new(10_000),
            execution_window: 3_600,
            is_revokable: true,
            reward: TokenAmount {
                amount: 100,
                token: token(),
            },
            gas_cost: GasPricing {
                gas_price: 10,
                token: token(),
            },
            guarantee: GasPricing {
                gas_price: 50,
                token: token(),
            },
        }
    }

    fn created_order() -> Order {
        request().into_order(OrderId::new(1), 0)
    }

    fn accepted_order(at: i64) -> Order {
        let mut order = created_order();
        order.status = OrderStatus::Accepted;
        order.executor = Some(Address::new("0xexec".to_string()));
        order.accepted_at = Some(Timestamp::new(at));
        order
    }

    fn executing_order(at: i64, gas_balance: i64) -> Order {
        let mut order = accepted_order(at);
        order.status = OrderStatus::Executing;
        order.gas_balance = gas_balance;
        order
    }

    #[test]
    fn test_create_escrow_total() {
        assert_eq!(validate_create(&request()), Ok(300));
    }

    #[test]
    fn test_create_rejects_inverted_period() {
        let mut req = request();
        req.execution_period_deadline = Timestamp::new(500);
        assert_eq!(validate_create(&req), Err(EngineError::InvalidWindow));
    }

    #[test]
    fn test_create_rejects_empty_period() {
        let mut req = request();
        req.execution_period_deadline = req.execution_period_start;
        assert_eq!(validate_create(&req), Err(EngineError::InvalidWindow));
    }

    #[test]
    fn test_create_rejects_nonpositive_window() {
        let mut req = request();
        req.execution_window = 0;
        assert_eq!(validate_create(&req), Err(EngineError::InvalidWindow));
    }

    #[test]
    fn test_create_rejects_window_wider_than_period() {
        let mut req = request();
        req.execution_window = 9_001;
        assert_eq!(validate_create(&req), Err(EngineError::InvalidWindow));
    }

    #[test]
    fn test_create_rejects_escrow_overflow() {
        let mut req = request();
        req.max_gas = i64::MAX;
        req.gas_cost.gas_price = 2;
        assert_eq!(validate_create(&req), Err(EngineError::AmountOverflow));
    }

    #[test]
    fn test_accept_from_created_before_deadline() {
        let order = created_order();
        assert_eq!(plan_accept(&order, Timestamp::new(2_000)), Ok(50));
    }

    #[test]
    fn test_accept_after_deadline_is_window_closed() {
        let order = created_order();
        assert_eq!(
            plan_accept(&order, Timestamp::new(10_000)),
            Err(EngineError::WindowClosed)
        );
    }

    #[test]
    fn test_accept_twice_is_already_accepted() {
        let order = accepted_order(2_000);
        assert_eq!(
            plan_accept(&order, Timestamp::new(2_500)),
            Err(EngineError::AlreadyAccepted)
        );
    }

    #[test]
    fn test_accept_terminal_is_already_accepted() {
        let mut order = created_order();
        order.status = OrderStatus::Expired;
        assert_eq!(
            plan_accept(&order, Timestamp::new(2_000)),
            Err(EngineError::AlreadyAccepted)
        );
    }

    #[test]
    fn test_execute_accumulates_gas() {
        let order = accepted_order(2_000);
        let executor = Address::new("0xexec".to_string());
        assert_eq!(
            plan_execute(&order, &executor, 8, Timestamp::new(2_100)),
            Ok(8)
        );

        let order = executing_order(2_000, 8);
        assert_eq!(
            plan_execute(&order, &executor, 12, Timestamp::new(2_200)),
            Ok(20)
        );
    }

    #[test]
    fn test_execute_rejects_gas_over_ceiling_without_mutation() {
        let order = executing_order(2_000, 15);
        let executor = Address::new("0xexec".to_string());
        assert_eq!(
            plan_execute(&order, &executor, 6, Timestamp::new(2_100)),
            Err(EngineError::GasExceeded)
        );
        // Planning is pure; the order is untouched by a rejected call.
        assert_eq!(order.gas_balance, 15);
    }

    #[test]
    fn test_execute_by_stranger_rejected() {
        let order = accepted_order(2_000);
        let stranger = Address::new("0xmallory".to_string());
        assert_eq!(
            plan_execute(&order, &stranger, 1, Timestamp::new(2_100)),
            Err(EngineError::NotExecutor)
        );
    }

    #[test]
    fn test_execute_outside_window_rejected() {
        let order = accepted_order(2_000);
        let executor = Address::new("0xexec".to_string());
        // Window is [2000, 5600]; period is [1000, 10000].
        assert_eq!(
            plan_execute(&order, &executor, 1, Timestamp::new(5_601)),
            Err(EngineError::WindowClosed)
        );
        assert_eq!(
            plan_execute(&order, &executor, 1, Timestamp::new(5_600)),
            Ok(1)
        );
    }

    #[test]
    fn test_execute_before_period_start_rejected() {
        // Accepted before the period opened; execution still must wait.
        let order = accepted_order(500);
        let executor = Address::new("0xexec".to_string());
        assert_eq!(
            plan_execute(&order, &executor, 1, Timestamp::new(900)),
            Err(EngineError::WindowClosed)
        );
    }

    #[test]
    fn test_execute_from_created_rejected() {
        let order = created_order();
        let executor = Address::new("0xexec".to_string());
        assert_eq!(
            plan_execute(&order, &executor, 1, Timestamp::new(2_000)),
            Err(EngineError::NotAccepted)
        );
    }

    #[test]
    fn test_settle_requires_recorded_execution() {
        let order = accepted_order(2_000);
        assert_eq!(
            plan_settle(&order, Timestamp::new(2_100)),
            Err(EngineError::NotAccepted)
        );
    }

    #[test]
    fn test_settle_from_executing_within_window() {
        let order = executing_order(2_000, 20);
        let breakdown = plan_settle(&order, Timestamp::new(2_500)).unwrap();
        assert_eq!(breakdown.executor_payout, 300);
        assert_eq!(breakdown.guarantee_refund, 50);
    }

    #[test]
    fn test_settle_after_window_rejected() {
        let order = executing_order(2_000, 20);
        assert_eq!(
            plan_settle(&order, Timestamp::new(5_601)),
            Err(EngineError::WindowClosed)
        );
    }

    #[test]
    fn test_settle_completed_is_not_accepted() {
        let mut order = executing_order(2_000, 20);
        order.status = OrderStatus::Completed;
        assert_eq!(
            plan_settle(&order, Timestamp::new(2_500)),
            Err(EngineError::NotAccepted)
        );
    }

    #[test]
    fn test_revoke_revokable_created_order() {
        let order = created_order();
        assert_eq!(plan_revoke(&order), Ok(300));
    }

    #[test]
    fn test_revoke_non_revokable_rejected() {
        let mut req = request();
        req.is_revokable = false;
        let order = req.into_order(OrderId::new(1), 0);
        assert_eq!(plan_revoke(&order), Err(EngineError::NotRevokable));
    }

    #[test]
    fn test_revoke_after_accept_rejected() {
        let order = accepted_order(2_000);
        assert_eq!(plan_revoke(&order), Err(EngineError::NotRevokable));
    }

    #[test]
    fn test_expire_after_deadline() {
        let order = accepted_order(2_000);
        let breakdown = plan_expire(&order, Timestamp::new(10_001)).unwrap();
        assert_eq!(breakdown.guarantee_forfeit, 50);
        assert_eq!(breakdown.creator_refund, 300);
    }

    #[test]
    fn test_expire_before_deadline_rejected() {
        let order = accepted_order(2_000);
        assert_eq!(
            plan_expire(&order, Timestamp::new(10_000)),
            Err(EngineError::WindowClosed)
        );
    }

    #[test]
    fn test_expire_created_order_rejected() {
        let order = created_order();
        assert_eq!(
            plan_expire(&order, Timestamp::new(10_001)),
            Err(EngineError::NotAccepted)
        );
    }

    #[test]
    fn test_is_expirable() {
        let order = accepted_order(2_000);
        assert!(!is_expirable(&order, Timestamp::new(10_000)));
        assert!(is_expirable(&order, Timestamp::new(10_001)));
        assert!(!is_expirable(&created_order(), Timestamp::new(10_001)));
    }

    #[test]
    fn test_status_graph_terminal_states_reject_everything() {
        let executor = Address::new("0xexec".to_string());
        for terminal in [
            OrderStatus::Completed,
            OrderStatus::Revoked,
            OrderStatus::Expired,
        ] {
            let mut order = executing_order(2_000, 10);
            order.status = terminal;
            let now = Timestamp::new(2_500);
            assert!(plan_accept(&order, now).is_err());
            assert!(plan_execute(&order, &executor, 1, now).is_err());
            assert!(plan_settle(&order, now).is_err());
            assert!(plan_revoke(&order).is_err());
        }
    }
}
