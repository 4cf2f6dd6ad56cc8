//! Watches a strategy config file for changes and drives validated reloads into a
//! [`HotReloadStrategy`], either immediately or deferred to a tick boundary via the
//! [`SafeReloadScheduler`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{error, info, warn};

use super::config::{HotReloadConfig, HotReloadConfigError, HotReloadStrategy};
use super::scheduler::SharedScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FileFingerprint {
    mtime_secs: u64,
    size: u64,
}

fn fingerprint(path: &Path) -> Option<FileFingerprint> {
    let meta = fs::metadata(path).ok()?;
    let mtime_secs = meta.modified().ok()?.duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(FileFingerprint { mtime_secs, size: meta.len() })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotReloadConfigOptions {
    pub watch_interval: Duration,
    pub backup_on_reload: bool,
    pub reload_on_tick: bool,
}

impl Default for HotReloadConfigOptions {
    fn default() -> Self {
        Self { watch_interval: Duration::from_secs(5), backup_on_reload: true, reload_on_tick: true }
    }
}

#[derive(Debug, Error)]
pub enum HotReloadError {
    #[error("failed to read config file: {0}")]
    Io(String),
    #[error(transparent)]
    Config(#[from] HotReloadConfigError),
}

/// Watches `path` for `(mtime, size)` changes and triggers validated reloads against a
/// [`HotReloadStrategy`]. The watch loop does file I/O (stat + copy); applying the config to the
/// strategy happens on whatever thread calls [`Self::poll`] or [`Self::trigger_reload`].
pub struct HotReloadManager {
    path: PathBuf,
    options: HotReloadConfigOptions,
    last_fingerprint: Mutex<Option<FileFingerprint>>,
    scheduler: SharedScheduler,
    reload_count: AtomicU64,
    error_count: AtomicU64,
    last_reload_epoch_ms: Mutex<Option<u64>>,
}

impl HotReloadManager {
    pub fn new(path: impl Into<PathBuf>, options: HotReloadConfigOptions, scheduler: SharedScheduler) -> Self {
        Self {
            path: path.into(),
            options,
            last_fingerprint: Mutex::new(None),
            scheduler,
            reload_count: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            last_reload_epoch_ms: Mutex::new(None),
        }
    }

    pub fn reload_count(&self) -> u64 {
        self.reload_count.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::SeqCst)
    }

    pub fn last_reload_epoch_ms(&self) -> Option<u64> {
        *self.last_reload_epoch_ms.lock()
    }

    /// Stats the watched file and, if its `(mtime, size)` changed since the last poll, runs a
    /// reload. Intended to be called every `watch_interval` from a dedicated watcher thread.
    pub fn poll(&self, strategy: &mut dyn HotReloadStrategy, now_epoch_ms: u64) {
        let Some(current) = fingerprint(&self.path) else {
            warn!(path = %self.path.display(), "hot-reload watch target unreadable, skipping poll");
            return;
        };
        let mut last = self.last_fingerprint.lock();
        if *last == Some(current) {
            return;
        }
        *last = Some(current);
        drop(last);

        if let Err(error) = self.trigger_reload(strategy, now_epoch_ms) {
            self.error_count.fetch_add(1, Ordering::SeqCst);
            error!(%error, "hot-reload failed, leaving previous config in place");
        }
    }

    pub fn trigger_reload(&self, strategy: &mut dyn HotReloadStrategy, now_epoch_ms: u64) -> Result<(), HotReloadError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| HotReloadError::Io(e.to_string()))?;
        let config = HotReloadConfig::parse(&raw)?;
        config.validate()?;
        strategy.validate_params(&config).map_err(HotReloadConfigError::StrategyValidationFailed)?;

        if self.options.backup_on_reload {
            self.backup(&raw, now_epoch_ms);
        }

        let (config_strategy, config_version) = (config.strategy.clone(), config.version);
        if self.options.reload_on_tick {
            self.scheduler.post(config);
        } else {
            strategy.update_params(&config).map_err(HotReloadConfigError::StrategyValidationFailed)?;
        }

        self.reload_count.fetch_add(1, Ordering::SeqCst);
        *self.last_reload_epoch_ms.lock() = Some(now_epoch_ms);
        info!(strategy = %config_strategy, version = config_version, "hot-reload applied");
        Ok(())
    }

    fn backup(&self, raw: &str, now_epoch_ms: u64) {
        let backup_path = PathBuf::from(format!("{}.backup.{now_epoch_ms}", self.path.display()));
        if let Err(error) = fs::write(&backup_path, raw) {
            warn!(%error, path = %backup_path.display(), "failed to back up config before reload");
        }
    }

    pub fn watch_interval(&self) -> Duration {
        self.options.watch_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotreload::config::{ConfigParam, RiskConfig};
    use crate::hotreload::scheduler::SafeReloadScheduler;
    use std::collections::BTreeMap;
    use tempfile::NamedTempFile;
    use tradecore_decimal::Decimal;

    struct AcceptingStrategy {
        applied: Option<HotReloadConfig>,
    }

    impl HotReloadStrategy for AcceptingStrategy {
        fn update_params(&mut self, config: &HotReloadConfig) -> Result<(), String> {
            self.applied = Some(config.clone());
            Ok(())
        }
        fn validate_params(&self, _config: &HotReloadConfig) -> Result<(), String> {
            Ok(())
        }
        fn current_params(&self) -> HotReloadConfig {
            self.applied.clone().expect("no config applied yet")
        }
    }

    fn write_config(file: &NamedTempFile, period: i64) {
        let mut params = BTreeMap::new();
        params.insert(
            "period".into(),
            ConfigParam { name: "period".into(), value: Decimal::from_i64(period), min: Decimal::from_i64(1), max: Decimal::from_i64(200), desc: String::new() },
        );
        let config = HotReloadConfig {
            strategy: "momentum".into(),
            version: 1,
            params,
            risk: RiskConfig { max_position_size: Decimal::from_i64(10), max_daily_loss: Decimal::from_i64(500), max_open_orders: 5 },
        };
        fs::write(file.path(), serde_json::to_string(&config).unwrap()).unwrap();
    }

    #[test]
    fn trigger_reload_defers_to_scheduler_when_reload_on_tick() {
        let file = NamedTempFile::new().unwrap();
        write_config(&file, 14);
        let scheduler = Arc::new(SafeReloadScheduler::new());
        let manager = HotReloadManager::new(file.path(), HotReloadConfigOptions { backup_on_reload: false, ..Default::default() }, scheduler.clone());

        let mut strategy = AcceptingStrategy { applied: None };
        manager.trigger_reload(&mut strategy, 1_000).unwrap();

        assert_eq!(manager.reload_count(), 1);
        assert!(strategy.applied.is_none());
        assert!(scheduler.on_tick_end().is_some());
    }

    #[test]
    fn trigger_reload_applies_immediately_when_not_deferred() {
        let file = NamedTempFile::new().unwrap();
        write_config(&file, 20);
        let scheduler = Arc::new(SafeReloadScheduler::new());
        let manager = HotReloadManager::new(
            file.path(),
            HotReloadConfigOptions { backup_on_reload: false, reload_on_tick: false, ..Default::default() },
            scheduler,
        );

        let mut strategy = AcceptingStrategy { applied: None };
        manager.trigger_reload(&mut strategy, 2_000).unwrap();
        assert!(strategy.applied.is_some());
    }

    #[test]
    fn invalid_config_increments_error_count_via_poll() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "not json").unwrap();
        let scheduler = Arc::new(SafeReloadScheduler::new());
        let manager = HotReloadManager::new(file.path(), HotReloadConfigOptions::default(), scheduler);
        let mut strategy = AcceptingStrategy { applied: None };
        manager.poll(&mut strategy, 3_000);
        assert_eq!(manager.error_count(), 1);
        assert_eq!(manager.reload_count(), 0);
    }
}
