#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity)]

//! # Data - Market Data Provider Abstraction
//!
//! Normalizes ticks from any number of [`provider::DataProvider`]s into a single
//! [`event::MarketEvent`] stream, republished on the [`engine::DataEngine`]'s own bus so
//! consumers (the backtest engine, the live trading engine) don't care how many feeds are behind
//! it.

pub mod engine;
pub mod event;
pub mod provider;

pub use engine::DataEngine;
pub use event::{MarketEvent, MarketEventKind};
pub use provider::{DataProvider, ReplayProvider};
