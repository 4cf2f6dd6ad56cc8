#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity)]

//! # Integration - Low-Level Event Plumbing
//!
//! Low-level, domain-agnostic building blocks shared by every other crate in the Tradecore
//! ecosystem: a synchronous topic-keyed publish/subscribe [`bus::Bus`], and small collection
//! utilities (`collection`, `snapshot`) used to avoid repeating common map/set aliases across
//! crates.
//!
//! Domain types (orders, positions, market events) are intentionally *not* defined here — see
//! `markets`, `execution`, `data` — so that this crate stays at the bottom of the dependency
//! graph and can be depended on by everything else without creating cycles.

pub mod bus;
pub mod collection;
pub mod snapshot;

pub use bus::{Bus, Subscriber};
pub use snapshot::Snapshot;
