#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity)]

//! # Markets - Pair, Side, Position, Account
//!
//! Core trading data structures shared by the execution, data, and backtest layers: a trading
//! [`pair::Pair`], [`side::Side`], and the signed [`position::Position`]/[`account::Account`]
//! model that every fill (live or simulated) updates.

pub mod account;
pub mod candle;
pub mod pair;
pub mod position;
pub mod side;

pub use account::Account;
pub use candle::Candle;
pub use pair::Pair;
pub use position::{Leverage, LeverageType, Position};
pub use side::Side;
