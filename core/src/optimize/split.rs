//! Splits a candle series into train/test windows for walk-forward evaluation, four ways.

use thiserror::Error;
use tradecore_markets::Candle;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SplitStrategy {
    FixedRatio,
    RollingWindow,
    ExpandingWindow,
    AnchoredWindow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    pub strategy: SplitStrategy,
    pub train_ratio: f64,
    pub min_train_size: usize,
    pub min_test_size: usize,
    pub gap_size: usize,
    /// `rolling_window`/`expanding_window`/`anchored_window` only; defaults to `train_size / 4`
    /// when `None`.
    pub step_size: Option<usize>,
    pub max_windows: Option<usize>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::FixedRatio,
            train_ratio: 0.7,
            min_train_size: 30,
            min_test_size: 10,
            gap_size: 0,
            step_size: None,
            max_windows: None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SplitError {
    #[error("data length {data_len} is below the minimum required (train {min_train} + test {min_test} + gap {gap})")]
    InsufficientData {
        data_len: usize,
        min_train: usize,
        min_test: usize,
        gap: usize,
    },
}

/// One `(train, test)` slice pair, 0-based and monotonic across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub id: usize,
    pub train_start: usize,
    pub train_end: usize,
    pub test_start: usize,
    pub test_end: usize,
}

impl Window {
    pub fn train_len(&self) -> usize {
        self.train_end - self.train_start
    }

    pub fn test_len(&self) -> usize {
        self.test_end - self.test_start
    }
}

pub struct DataSplitter;

impl DataSplitter {
    /// Computes window boundaries over a series of `data_len` bars, without slicing the series
    /// itself — callers index `candles[window.train_start..window.train_end]` etc. themselves.
    pub fn split(data_len: usize, config: &SplitConfig) -> Result<Vec<Window>, SplitError> {
        if data_len < config.min_train_size + config.min_test_size + config.gap_size {
            return Err(SplitError::InsufficientData {
                data_len,
                min_train: config.min_train_size,
                min_test: config.min_test_size,
                gap: config.gap_size,
            });
        }

        let windows = match config.strategy {
            SplitStrategy::FixedRatio => Self::fixed_ratio(data_len, config),
            SplitStrategy::RollingWindow => Self::rolling_window(data_len, config),
            SplitStrategy::ExpandingWindow => Self::expanding_window(data_len, config),
            SplitStrategy::AnchoredWindow => Self::anchored_window(data_len, config),
        };

        Ok(match config.max_windows {
            Some(max) => windows.into_iter().take(max).collect(),
            None => windows,
        })
    }

    fn fixed_ratio(data_len: usize, config: &SplitConfig) -> Vec<Window> {
        let train_size = ((data_len as f64) * config.train_ratio).floor() as usize;
        let train_size = train_size.max(config.min_train_size);
        let test_start = train_size + config.gap_size;
        vec![Window {
            id: 0,
            train_start: 0,
            train_end: train_size,
            test_start,
            test_end: data_len,
        }]
    }

    fn rolling_window(data_len: usize, config: &SplitConfig) -> Vec<Window> {
        let train_size = ((data_len as f64) * config.train_ratio).floor().max(config.min_train_size as f64) as usize;
        let step = config.step_size.unwrap_or((train_size / 4).max(1));
        let mut windows = Vec::new();
        let mut train_start = 0;

        loop {
            let train_end = train_start + train_size;
            let test_start = train_end + config.gap_size;
            let test_end = (test_start + step).min(data_len);
            if test_end <= test_start || test_end - test_start < config.min_test_size || test_start >= data_len {
                break;
            }
            windows.push(Window { id: windows.len(), train_start, train_end, test_start, test_end });
            if let Some(max) = config.max_windows {
                if windows.len() >= max {
                    break;
                }
            }
            train_start += step;
        }
        windows
    }

    fn expanding_window(data_len: usize, config: &SplitConfig) -> Vec<Window> {
        let initial_train = ((data_len as f64) * config.train_ratio / 2.0).floor().max(config.min_train_size as f64) as usize;
        let step = config.step_size.unwrap_or((initial_train / 4).max(1));
        let mut windows = Vec::new();
        let mut train_end = initial_train;

        loop {
            let test_start = train_end + config.gap_size;
            let test_end = (test_start + step).min(data_len);
            if test_end <= test_start || test_end - test_start < config.min_test_size || test_start >= data_len {
                break;
            }
            windows.push(Window { id: windows.len(), train_start: 0, train_end, test_start, test_end });
            if let Some(max) = config.max_windows {
                if windows.len() >= max {
                    break;
                }
            }
            train_end += step;
        }
        windows
    }

    fn anchored_window(data_len: usize, config: &SplitConfig) -> Vec<Window> {
        // The first window matches expanding's; every subsequent window rolls forward like
        // rolling_window's, so an early reference window (train_start == 0) is always retained
        // as windows[0].
        let mut windows = Self::expanding_window(data_len, config);
        if windows.len() <= 1 {
            return windows;
        }
        let first = windows[0];
        let train_size = first.train_len();
        let step = config.step_size.unwrap_or((train_size / 4).max(1));

        let mut rolled = vec![first];
        let mut train_start = first.train_end - train_size + step;
        loop {
            let train_end = train_start + train_size;
            let test_start = train_end + config.gap_size;
            let test_end = (test_start + step).min(data_len);
            if test_end <= test_start || test_end - test_start < config.min_test_size || test_start >= data_len {
                break;
            }
            rolled.push(Window { id: rolled.len(), train_start, train_end, test_start, test_end });
            if let Some(max) = config.max_windows {
                if rolled.len() >= max {
                    break;
                }
            }
            train_start += step;
        }
        rolled
    }
}

/// A contiguous slice of a candle series produced by [`DataSplitter::split`].
pub fn slice<'a>(candles: &'a [Candle], start: usize, end: usize) -> &'a [Candle] {
    &candles[start..end]
}
