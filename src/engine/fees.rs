//! Protocol fee schedule, keyed by order-type index.
//!
//! Rates are fractions over [`DENOM`] and apply prospectively: the rate in
//! force at creation is snapshotted into the order, so later `set` calls
//! never change the settlement of an existing order.

use std::collections::HashMap;
use thiserror::Error;

/// Denominator for fee rates: a rate of 500 is 5%.
pub const DENOM: i64 = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeeRateError {
    #[error("fee rate {0} exceeds denominator {DENOM}")]
    RateTooHigh(i64),
    #[error("fee rate {0} is negative")]
    RateNegative(i64),
}

/// Mutable fee configuration, read only at order creation.
#[derive(Debug, Clone, Default)]
pub struct FeeSchedule {
    rates: HashMap<u8, i64>,
    default_rate: i64,
}

impl FeeSchedule {
    pub fn new(default_rate: i64) -> Self {
        FeeSchedule {
            rates: HashMap::new(),
            default_rate,
        }
    }

    /// Current rate for an order type; the default rate when unset.
    pub fn rate(&self, order_type: u8) -> i64 {
        self.rates
            .get(&order_type)
            .copied()
            .unwrap_or(self.default_rate)
    }

    /// Set the prospective rate for an order type.
    pub fn set(&mut self, order_type: u8, rate: i64) -> Result<(), FeeRateError> {
        if rate < 0 {
            return Err(FeeRateError::RateNegative(rate));
        }
        if rate > DENOM {
            return Err(FeeRateError::RateTooHigh(rate));
        }
        self.rates.insert(order_type, rate);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_type_uses_default() {
        let schedule = FeeSchedule::new(250);
        assert_eq!(schedule.rate(0), 250);
        assert_eq!(schedule.rate(2), 250);
    }

    #[test]
    fn test_set_and_get() {
        let mut schedule = FeeSchedule::new(0);
        schedule.set(1, 500).unwrap();
        assert_eq!(schedule.rate(1), 500);
        assert_eq!(schedule.rate(0), 0);
    }

    #[test]
    fn test_rate_bounds() {
        let mut schedule = FeeSchedule::new(0);
        assert_eq!(schedule.set(0, DENOM + 1), Err(FeeRateError::RateTooHigh(DENOM + 1)));
        assert_eq!(schedule.set(0, -1), Err(FeeRateError::RateNegative(-1)));
        assert_eq!(schedule.set(0, DENOM), Ok(()));
    }
}
