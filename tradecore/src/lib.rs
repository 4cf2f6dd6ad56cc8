//! Facade crate for the tradecore ecosystem.
//!
//! Re-exports every sub-crate under a single namespace for downstream users who would rather
//! depend on one crate than wire up the individual `tradecore-*` paths themselves.
//!
//! ```no_run
//! use tradecore::markets::Pair;
//! use tradecore::core::BacktestEngine;
//!
//! let _pair = Pair::parse("BTC/USDT").unwrap();
//! ```

pub use tradecore_analytics as analytics;
pub use tradecore_core as core;
pub use tradecore_data as data;
pub use tradecore_decimal as decimal;
pub use tradecore_execution as execution;
pub use tradecore_integration as integration;
pub use tradecore_markets as markets;
pub use tradecore_risk as risk;
pub use tradecore_trader as trader;

/// Single-import convenience for the handful of types most binaries touch directly.
pub mod prelude {
    pub use crate::core::{BacktestEngine, ExecutionEngine, LiveTradingEngine, MarketCache, SystemBuilder};
    pub use crate::decimal::{Decimal, Timestamp};
    pub use crate::markets::{Candle, Pair, Side};
    pub use crate::trader::{Strategy, StrategyContext};
}
