//! Dual-indexed order store: active/history partitions keyed by both client and exchange id.

use super::{ClientOrderId, ExchangeOrderId, Order, OrderError, OrderStatus};
use thiserror::Error;
use tracing::warn;
use tradecore_decimal::{Decimal, Timestamp};
use tradecore_integration::collection::FnvIndexMap;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderStoreError {
    #[error("order {0} is already tracked by the store")]
    Duplicate(ClientOrderId),
    #[error("no active order with client id {0}")]
    UnknownClientOrderId(ClientOrderId),
    #[error("no active order with exchange id {0}")]
    UnknownExchangeOrderId(ExchangeOrderId),
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Holds every order the engine has submitted, split into an `active` partition (not yet in a
/// terminal state) and a `history` partition (terminal). Orders are addressable by either the
/// client-assigned id (known at submission) or the exchange-assigned id (known only after ack).
///
/// Invariants:
/// - O1: every key in `exchange_index` maps to a client id present in `active`.
/// - O2: a given `client_order_id` is present in exactly one of `active` or `history`, never both.
/// - O3: an order moves from `active` to `history` exactly once, the moment its status becomes
///   terminal; it is removed from `active` with a swap-remove (no ordering guarantee is promised
///   on `active_orders()`).
/// - O4: inserting a `client_order_id` already tracked by the store (active or history) fails
///   rather than silently overwriting it.
#[derive(Debug, Default)]
pub struct OrderStore {
    active: FnvIndexMap<ClientOrderId, Order>,
    history: FnvIndexMap<ClientOrderId, Order>,
    exchange_index: FnvIndexMap<ExchangeOrderId, ClientOrderId>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks a newly created order as active. Fails if `client_order_id` is already tracked
    /// (O4).
    pub fn insert_new(&mut self, order: Order) -> Result<(), OrderStoreError> {
        let id = order.client_order_id.clone();
        if self.active.contains_key(&id) || self.history.contains_key(&id) {
            return Err(OrderStoreError::Duplicate(id));
        }
        self.active.insert(id, order);
        Ok(())
    }

    /// Records the exchange-assigned id for an active order once the venue acknowledges it.
    pub fn acknowledge(
        &mut self,
        client_order_id: &ClientOrderId,
        exchange_order_id: ExchangeOrderId,
        now: Timestamp,
    ) -> Result<(), OrderStoreError> {
        let order = self
            .active
            .get_mut(client_order_id)
            .ok_or_else(|| OrderStoreError::UnknownClientOrderId(client_order_id.clone()))?;
        order.exchange_order_id = Some(exchange_order_id.clone());
        order.transition(OrderStatus::Submitted, now)?;
        self.exchange_index
            .insert(exchange_order_id, client_order_id.clone());
        Ok(())
    }

    pub fn get_active(&self, client_order_id: &ClientOrderId) -> Option<&Order> {
        self.active.get(client_order_id)
    }

    pub fn get_by_exchange_id(&self, exchange_order_id: &ExchangeOrderId) -> Option<&Order> {
        self.exchange_index
            .get(exchange_order_id)
            .and_then(|client_id| self.active.get(client_id))
    }

    /// Applies a fill to an active order, moving it to `history` if the fill fills it completely
    /// (O3).
    pub fn apply_fill(
        &mut self,
        client_order_id: &ClientOrderId,
        fill_qty: Decimal,
        fill_price: Decimal,
        now: Timestamp,
    ) -> Result<(), OrderStoreError> {
        let order = self
            .active
            .get_mut(client_order_id)
            .ok_or_else(|| OrderStoreError::UnknownClientOrderId(client_order_id.clone()))?;
        order.apply_fill(fill_qty, fill_price, now)?;
        if order.status.is_terminal() {
            self.move_to_history(client_order_id);
        }
        Ok(())
    }

    /// Forces an active order straight to `Filled`, moving it to `history` (O3). For
    /// reconciliation paths (crash recovery against the venue's own status) where only the
    /// terminal status is known, not the fill price/quantity that produced it.
    pub fn mark_filled(
        &mut self,
        client_order_id: &ClientOrderId,
        now: Timestamp,
    ) -> Result<(), OrderStoreError> {
        let order = self
            .active
            .get_mut(client_order_id)
            .ok_or_else(|| OrderStoreError::UnknownClientOrderId(client_order_id.clone()))?;
        if order.avg_fill_price == Decimal::ZERO {
            order.avg_fill_price = order.price.unwrap_or(Decimal::ZERO);
        }
        order.filled_quantity = order.quantity;
        order.status = OrderStatus::Filled;
        order.updated_at = now;
        self.move_to_history(client_order_id);
        Ok(())
    }

    /// Cancels an active order, moving it to `history` (O3).
    pub fn cancel(
        &mut self,
        client_order_id: &ClientOrderId,
        now: Timestamp,
    ) -> Result<(), OrderStoreError> {
        let order = self
            .active
            .get_mut(client_order_id)
            .ok_or_else(|| OrderStoreError::UnknownClientOrderId(client_order_id.clone()))?;
        order.transition(OrderStatus::Cancelled, now)?;
        self.move_to_history(client_order_id);
        Ok(())
    }

    /// Rejects an active order, moving it to `history` (O3).
    pub fn reject(
        &mut self,
        client_order_id: &ClientOrderId,
        now: Timestamp,
    ) -> Result<(), OrderStoreError> {
        let order = self
            .active
            .get_mut(client_order_id)
            .ok_or_else(|| OrderStoreError::UnknownClientOrderId(client_order_id.clone()))?;
        order.transition(OrderStatus::Rejected, now)?;
        self.move_to_history(client_order_id);
        Ok(())
    }

    /// Cancels every active order, returning the ids that were cancelled.
    pub fn cancel_all(&mut self, now: Timestamp) -> Vec<ClientOrderId> {
        let ids: Vec<ClientOrderId> = self.active.keys().cloned().collect();
        let mut cancelled = Vec::with_capacity(ids.len());
        for id in ids {
            if self.cancel(&id, now).is_ok() {
                cancelled.push(id);
            }
        }
        cancelled
    }

    /// Active orders whose `submitted_at` predates `now - timeout_ms`, for the engine's
    /// stale-order sweep.
    pub fn timed_out(&self, now: Timestamp, timeout_ms: i64) -> Vec<ClientOrderId> {
        self.active
            .values()
            .filter(|order| now.millis() - order.submitted_at.millis() > timeout_ms)
            .map(|order| order.client_order_id.clone())
            .collect()
    }

    /// Removes an order from `active` without moving it to `history`, for rolling back an insert
    /// whose subsequent client call failed before the order ever truly existed at the venue.
    pub fn withdraw(&mut self, client_order_id: &ClientOrderId) -> Option<Order> {
        let (_, order) = self.active.swap_remove_entry(client_order_id)?;
        if let Some(exchange_id) = order.exchange_order_id.clone() {
            self.exchange_index.swap_remove(&exchange_id);
        }
        Some(order)
    }

    pub fn active_orders(&self) -> impl Iterator<Item = &Order> {
        self.active.values()
    }

    pub fn history(&self) -> impl Iterator<Item = &Order> {
        self.history.values()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn history_count(&self) -> usize {
        self.history.len()
    }

    fn move_to_history(&mut self, client_order_id: &ClientOrderId) {
        let Some((id, order)) = self.active.swap_remove_entry(client_order_id) else {
            warn!(?client_order_id, "move_to_history called for untracked order");
            return;
        };
        if let Some(exchange_id) = order.exchange_order_id.clone() {
            self.exchange_index.swap_remove(&exchange_id);
        }
        self.history.insert(id, order);
    }

    /// Drains the store, returning the total number of orders it held (active + history).
    pub fn deinit(&mut self) -> usize {
        let total = self.active.len() + self.history.len();
        self.active.clear();
        self.history.clear();
        self.exchange_index.clear();
        total
    }
}
