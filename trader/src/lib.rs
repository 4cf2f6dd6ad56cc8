#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity)]

//! # Trader - Strategy Interfaces and Parameter Space
//!
//! The contract a strategy implements ([`strategy::Strategy`]), the typed parameter space it is
//! constructed from ([`parameter::ParameterSet`]), and the hot-reload capability
//! ([`hotreload::HotReloadStrategy`]) a strategy opts into to accept live parameter changes.
//!
//! This crate never depends on the engine that drives a strategy (`tradecore-core`); instead
//! [`context::StrategyContext`] exposes the engine's cache and executor as trait objects, so the
//! dependency points the other way.

pub mod context;
pub mod hotreload;
pub mod parameter;
pub mod strategy;

pub use context::{MarketDataView, OrderExecutor, StrategyContext};
pub use hotreload::{HotReloadError, HotReloadStrategy};
pub use parameter::{ParameterError, ParameterRange, ParameterSet, ParameterType, ParameterValue, StrategyParameter};
pub use strategy::Strategy;
