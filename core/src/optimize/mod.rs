//! Parameter optimization: a hand-rolled thread pool for fanning backtests out across cores, a
//! grid-search sweep over a strategy's parameter space, a train/test data splitter, a
//! walk-forward analyzer that chains the two together, and an overfitting detector that scores
//! the result.

pub mod grid;
pub mod overfitting;
pub mod pool;
pub mod split;
pub mod walk_forward;

pub use grid::{GridSearchOptimizer, GridSearchReport, Objective, OptimizationConfig, OptimizeError, TrialResult};
pub use overfitting::{OverfittingConfig, OverfittingDetector, OverfittingReport, Recommendation};
pub use pool::ThreadPool;
pub use split::{DataSplitter, SplitConfig, SplitError, SplitStrategy, Window};
pub use walk_forward::{OverallStats, WalkForwardAnalyzer, WalkForwardReport, WindowResult};
