//! Settlement arithmetic: executor payout, protocol fee, creator refund.

use crate::domain::{Order, GAS_AMOUNT_UNIT_BASIS};
use crate::engine::fees::DENOM;

/// How a settlement splits the creator's escrow and the executor's
/// guarantee. All four legs move in a single atomic step; their sum equals
/// the escrowed total plus the guarantee deposit (conservation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementBreakdown {
    /// Paid to the executor: reward plus gas reimbursement, net of fee.
    pub executor_payout: i64,
    /// Paid to the fee sink, carved out of the gross payout.
    pub protocol_fee: i64,
    /// Unspent gas escrow returned to the creator.
    pub creator_refund: i64,
    /// Guarantee deposit returned to the executor.
    pub guarantee_refund: i64,
}

/// How a timeout splits funds: the guarantee compensates the creator for
/// non-performance and the untouched escrow goes back to the creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryBreakdown {
    /// Executor's guarantee, forfeited to the creator.
    pub guarantee_forfeit: i64,
    /// Full escrow (reward plus gas reserve) returned to the creator.
    pub creator_refund: i64,
}

/// Compute the timeout split for an order whose deadline lapsed without
/// settlement. Nothing was paid out, so the whole escrow returns. `None` if
/// the escrow arithmetic overflows.
pub fn expiry_breakdown(order: &Order) -> Option<ExpiryBreakdown> {
    Some(ExpiryBreakdown {
        guarantee_forfeit: order.guarantee.gas_price,
        creator_refund: order.creator_escrow()?,
    })
}

/// Compute the settlement split for an order.
///
/// Gross payout is `reward + min(gas_balance, max_gas) * gas_price`, capped
/// at the escrowed total so the creator refund can never go negative.
/// The fee is `gross * fee_rate / DENOM`, deducted from the executor's leg.
/// `None` if the arithmetic overflows.
pub fn settlement_breakdown(order: &Order) -> Option<SettlementBreakdown> {
    let escrow = order.creator_escrow()?;
    let billable_gas = order.gas_balance.min(order.max_gas);
    let gas_reimbursement =
        billable_gas.checked_mul(order.gas_cost.gas_price)? / GAS_AMOUNT_UNIT_BASIS;

    let gross = order
        .reward
        .amount
        .checked_add(gas_reimbursement)?
        .min(escrow);

    let protocol_fee = ((gross as i128 * order.fee_rate as i128) / DENOM as i128) as i64;

    Some(SettlementBreakdown {
        executor_payout: gross - protocol_fee,
        protocol_fee,
        creator_refund: escrow - gross,
        guarantee_refund: order.guarantee.gas_price,
    })
}
