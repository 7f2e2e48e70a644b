//! Fungible-asset ledger boundary.
//!
//! The engine never holds token balances itself; it moves value through this
//! interface and relies on the ledger's single-transfer atomicity: a transfer
//! either fully happens or fully fails, never partially.

use crate::domain::Address;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod memory;

pub use memory::InMemoryLedger;

/// Funding shortfalls reported by the ledger. Any operation that hits one is
/// aborted atomically with no partial escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The holder has not approved enough for the pull.
    #[error("insufficient allowance")]
    InsufficientAllowance,
    /// The paying account's balance does not cover the amount.
    #[error("insufficient balance")]
    InsufficientBalance,
}

/// An opaque fungible-asset ledger: balances, transfers, allowance pulls.
///
/// In production this fronts a token contract; the test suite and the local
/// service use [`InMemoryLedger`].
#[async_trait]
pub trait AssetLedger: Send + Sync + fmt::Debug {
    /// Pull `amount` of `token` from `holder` into `recipient`, consuming
    /// allowance granted by the holder.
    async fn transfer_from(
        &self,
        token: &Address,
        holder: &Address,
        recipient: &Address,
        amount: i64,
    ) -> Result<(), LedgerError>;

    /// Move `amount` of `token` from `sender` to `recipient`.
    async fn transfer(
        &self,
        token: &Address,
        sender: &Address,
        recipient: &Address,
        amount: i64,
    ) -> Result<(), LedgerError>;

    /// Current balance of `holder` in `token`.
    async fn balance_of(&self, token: &Address, holder: &Address) -> i64;
}
