//! Domain types for the order-settlement engine.
//!
//! This module provides:
//! - Domain primitives: Timestamp, Address, OrderId
//! - The Order record, its status enum, and payment specs
//! - Typed query filter, the OrderView read model, and lifecycle events

pub mod event;
pub mod filter;
pub mod order;
pub mod primitives;

pub use event::{EventRecord, OrderEvent};
pub use filter::{OrderFilter, OrderView, MAX_PAGE_SIZE};
pub use order::{GasPricing, Order, OrderStatus, TokenAmount, GAS_AMOUNT_UNIT_BASIS};
pub use primitives::{Address, OrderId, Timestamp};
