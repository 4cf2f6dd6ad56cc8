//! Aggregate error type for the engine orchestration layer.
//!
//! Each subsystem crate keeps its own closed error enum; this type exists only at the boundary
//! where `core` calls into several of them and needs one `Result<_, E>` to return.

use thiserror::Error;
use tradecore_execution::{ExecutionClientError, OrderError};
use tradecore_markets::position::PositionError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("execution client error: {0}")]
    Execution(#[from] ExecutionClientError),

    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("position error: {0}")]
    Position(#[from] PositionError),

    #[error("optimize error: {0}")]
    Optimize(#[from] crate::optimize::OptimizeError),

    #[error("hot-reload error: {0}")]
    HotReload(#[from] crate::hotreload::HotReloadConfigError),

    #[error("invalid configuration: {0}")]
    Configuration(String),
}
