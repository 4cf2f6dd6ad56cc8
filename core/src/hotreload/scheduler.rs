//! Defers an already-validated config's application to the next `on_tick_end` boundary, so a
//! reload never lands mid-tick while a strategy callback is running.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::HotReloadConfig;

#[derive(Debug, Default)]
pub struct SafeReloadScheduler {
    in_tick: AtomicBool,
    pending: Mutex<Option<HotReloadConfig>>,
}

impl SafeReloadScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_tick(&self) {
        self.in_tick.store(true, Ordering::SeqCst);
    }

    /// Marks the tick boundary as crossed and hands back a config to apply, if one arrived
    /// while `in_tick` was set.
    pub fn on_tick_end(&self) -> Option<HotReloadConfig> {
        self.in_tick.store(false, Ordering::SeqCst);
        self.pending.lock().take()
    }

    /// Queues `config` for application at the next [`Self::on_tick_end`]. If no tick is
    /// currently in flight, the config is still queued rather than applied inline, so callers
    /// always observe the same "applies at the next boundary" contract.
    pub fn post(&self, config: HotReloadConfig) {
        *self.pending.lock() = Some(config);
    }

    pub fn is_in_tick(&self) -> bool {
        self.in_tick.load(Ordering::SeqCst)
    }
}

/// Shared handle a strategy host clones into both the tick loop and the hot-reload watcher
/// thread.
pub type SharedScheduler = Arc<SafeReloadScheduler>;
