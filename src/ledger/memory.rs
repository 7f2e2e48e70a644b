//! In-memory asset ledger for the local service and tests.

use super::{AssetLedger, LedgerError};
use crate::domain::Address;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct LedgerState {
    /// (token, holder) -> balance.
    balances: HashMap<(Address, Address), i64>,
    /// (token, holder) -> amount the engine may pull via transfer_from.
    allowances: HashMap<(Address, Address), i64>,
}

/// Token balances and allowances held in a mutex-guarded map. Each transfer
/// is one critical section, which is what gives it all-or-nothing semantics.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a holder's balance (test/bootstrap faucet).
    pub async fn credit(&self, token: &Address, holder: &Address, amount: i64) {
        let mut state = self.state.lock().await;
        *state
            .balances
            .entry((token.clone(), holder.clone()))
            .or_insert(0) += amount;
    }

    /// Set the amount the engine may pull from a holder.
    pub async fn approve(&self, token: &Address, holder: &Address, amount: i64) {
        let mut state = self.state.lock().await;
        state
            .allowances
            .insert((token.clone(), holder.clone()), amount);
    }

    pub async fn allowance(&self, token: &Address, holder: &Address) -> i64 {
        let state = self.state.lock().await;
        state
            .allowances
            .get(&(token.clone(), holder.clone()))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl AssetLedger for InMemoryLedger {
    async fn transfer_from(
        &self,
        token: &Address,
        holder: &Address,
        recipient: &Address,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;

        let allowance_key = (token.clone(), holder.clone());
        let allowance = state.allowances.get(&allowance_key).copied().unwrap_or(0);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance);
        }

        let from_key = (token.clone(), holder.clone());
        let balance = state.balances.get(&from_key).copied().unwrap_or(0);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }

        state.allowances.insert(allowance_key, allowance - amount);
        state.balances.insert(from_key, balance - amount);
        *state
            .balances
            .entry((token.clone(), recipient.clone()))
            .or_insert(0) += amount;
        Ok(())
    }

    async fn transfer(
        &self,
        token: &Address,
        sender: &Address,
        recipient: &Address,
        amount: i64,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;

        let from_key = (token.clone(), sender.clone());
        let balance = state.balances.get(&from_key).copied().unwrap_or(0);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }

        state.balances.insert(from_key, balance - amount);
        *state
            .balances
            .entry((token.clone(), recipient.clone()))
            .or_insert(0) += amount;
        Ok(())
    }

    async fn balance_of(&self, token: &Address, holder: &Address) -> i64 {
        let state = self.state.lock().await;
        state
            .balances
            .get(&(token.clone(), holder.clone()))
            .copied()
            .unwrap_or(0)
    }
}
