//! Live config reload for running strategies: watch a JSON file by `(mtime, size)`, validate a
//! change against parameter bounds and the strategy's own rules, and apply it either immediately
//! or deferred to the next tick boundary.

pub mod config;
pub mod manager;
pub mod scheduler;

pub use config::{ConfigParam, HotReloadConfig, HotReloadConfigError, HotReloadStrategy, RiskConfig};
pub use manager::{HotReloadConfigOptions, HotReloadError, HotReloadManager};
pub use scheduler::{SafeReloadScheduler, SharedScheduler};
