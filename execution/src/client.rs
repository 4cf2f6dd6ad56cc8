//! Unified interface every execution venue (live or simulated) implements.

use crate::balance::AssetBalance;
use crate::order::{CancelRequest, ClientOrderId, OrderRequest, OrderResult, OrderStatus};
use async_trait::async_trait;
use thiserror::Error;
use tradecore_decimal::Timestamp;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ExecutionClientError {
    #[error("venue rejected request: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unknown order: {0}")]
    UnknownOrder(ClientOrderId),
}

/// Implemented by every order-execution backend (a real venue adapter or
/// [`crate::simulated::SimulatedExecutor`]), so the orchestrating engine can drive either through
/// one interface.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Opens an order. Never returns `Err` for a venue-level rejection: that case is carried in
    /// [`OrderResult::Rejected`]. `Err` is reserved for transport/connectivity failures.
    async fn open_order(&self, request: OrderRequest) -> Result<OrderResult, ExecutionClientError>;

    async fn cancel_order(&self, request: CancelRequest) -> Result<(), ExecutionClientError>;

    async fn cancel_all_orders(&self, now: Timestamp) -> Result<Vec<ClientOrderId>, ExecutionClientError>;

    async fn account_balances(&self) -> Result<Vec<AssetBalance>, ExecutionClientError>;

    /// Queries the venue for an order's current status, for reconciling engine state after a
    /// restart. `None` means the venue has no record of the order at all.
    async fn get_order_status(
        &self,
        client_order_id: &ClientOrderId,
    ) -> Result<Option<OrderStatus>, ExecutionClientError>;
}
