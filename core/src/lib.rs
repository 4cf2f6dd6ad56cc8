#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Core - Engine Orchestration
//!
//! Wires the lower-level crates (`markets`, `execution`, `risk`, `data`, `analytics`, `trader`)
//! into the running pieces of a trading system: a self-populating market [`cache::MarketCache`],
//! an [`engine::ExecutionEngine`] that gates, tracks, and routes orders, a [`backtest::BacktestEngine`]
//! that replays history through a strategy, an [`optimize`] module that sweeps a strategy's
//! parameter space, splits data into train/test windows, walk-forward analyzes the result, and
//! scores it for overfitting, a [`hotreload::HotReloadManager`] that lets a running strategy pick
//! up config changes without a restart, live trading engines (sync and async) that run a strategy
//! against real market data, and a [`system::SystemBuilder`] that assembles all of the above from
//! a [`system::SystemConfig`].

pub mod backtest;
pub mod cache;
pub mod engine;
pub mod error;
pub mod event;
pub mod hotreload;
pub mod live;
pub mod logging;
pub mod optimize;
pub mod shutdown;
pub mod system;

pub use backtest::{BacktestConfig, BacktestEngine, BacktestResult};
pub use cache::MarketCache;
pub use engine::{EngineError, EngineState, ExecutionEngine, OrderOutcome};
pub use error::CoreError;
pub use event::Event;
pub use hotreload::{HotReloadConfig, HotReloadManager};
pub use live::{AsyncLiveTradingEngine, LiveEngineError, LiveState, LiveTradingEngine};
pub use optimize::{GridSearchOptimizer, Objective, WalkForwardAnalyzer};
pub use system::{SystemBuilder, SystemConfig};
