//! Fluent assembly of a running system from a [`config::SystemConfig`], and the
//! [`builder::SystemBuilder`] that wires the pieces together with validation instead of panics.

pub mod builder;
pub mod config;

pub use builder::{BuiltSystem, RiskMode, SystemBuilder};
pub use config::{BacktestSettings, ExecutionConfig, RiskLimits, SystemConfig};
