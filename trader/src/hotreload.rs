//! Strategy-side contract for hot-reloading parameters: a strategy that implements this trait
//! can have its live parameters swapped without restarting the engine driving it.
//!
//! `Config` is left abstract rather than tied to a concrete type here, so this crate never needs
//! to depend on `tradecore-core`'s `HotReloadConfig`, which wraps a [`crate::parameter::ParameterSet`]
//! together with file-level metadata (source path, mtime) this crate has no business knowing about.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotReloadError {
    #[error("rejected reload: {0}")]
    Rejected(String),
}

pub trait HotReloadStrategy {
    type Config;

    /// Checks whether `config` would be accepted by [`Self::update_params`], without applying
    /// it. Called before a reload is scheduled so a bad config never reaches a running strategy.
    fn validate_params(&self, config: &Self::Config) -> Result<(), HotReloadError>;

    /// Applies `config`, replacing the strategy's current parameters. Only called after
    /// [`Self::validate_params`] has already accepted `config`.
    fn update_params(&mut self, config: &Self::Config) -> Result<(), HotReloadError>;

    /// Returns the strategy's currently active configuration.
    fn get_current_params(&self) -> Self::Config;
}
