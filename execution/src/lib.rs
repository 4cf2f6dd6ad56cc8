#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Execution - Order Lifecycle and Venue Abstraction
//!
//! Order types, the dual-indexed [`order::store::OrderStore`], the [`client::ExecutionClient`]
//! trait every venue adapter implements, and [`simulated::SimulatedExecutor`], a fill simulator
//! used for backtesting and paper trading.

pub mod balance;
pub mod client;
pub mod order;
pub mod simulated;

pub use balance::{AssetBalance, Balance};
pub use client::{ExecutionClient, ExecutionClientError};
pub use order::{
    store::OrderStore, CancelRequest, ClientOrderId, ExchangeOrderId, Order, OrderError,
    OrderKind, OrderRequest, OrderResult, OrderStatus, TimeInForce,
};
pub use simulated::{SimulatedExecutor, SimulatedExecutorConfig, TradeStatistics};
