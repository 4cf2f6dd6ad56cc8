#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]

//! # Analytics - Performance Metrics
//!
//! Sharpe, Sortino, Calmar, win rate, profit factor and drawdown, plus the statistical
//! primitives ([`algorithm`]) the orchestration layer above this crate uses to build the
//! walk-forward overfitting detector.

pub mod algorithm;
pub mod metric;
pub mod time;

pub use metric::{CalmarRatio, Drawdown, DrawdownGenerator, ProfitFactor, SharpeRatio, SortinoRatio, WinRate};
pub use time::{Annual252, Annual365, Daily, TimeInterval};
