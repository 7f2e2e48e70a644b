pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Address, EventRecord, GasPricing, Order, OrderEvent, OrderFilter, OrderId, OrderStatus,
    OrderView, Timestamp, TokenAmount,
};
pub use error::AppError;
pub use ledger::{AssetLedger, InMemoryLedger, LedgerError};
pub use service::{OrderService, ServiceError};
