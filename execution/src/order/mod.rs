//! Order types: identifiers, request/result payloads, and the order status lattice.

pub mod store;

use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};
use tradecore_decimal::{Decimal, Timestamp};
use tradecore_markets::{Pair, Side};

/// Client-assigned order identifier, unique per strategy/session.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, Constructor,
)]
pub struct ClientOrderId(pub String);

/// Exchange-assigned order identifier, only known once the venue acknowledges the order.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, Constructor,
)]
pub struct ExchangeOrderId(pub String);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Market,
    Limit,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    GoodTilCancel,
    GoodUntilEndOfDay,
    ImmediateOrCancel,
    FillOrKill,
}

/// Order lifecycle status. Transitions only move forward through the lattice below; the
/// terminal states (`Filled`, `Cancelled`, `Rejected`, `Expired`) never transition again.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Submitted,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
    Expired,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected | OrderStatus::Expired
        )
    }

    /// Whether moving from `self` to `next` is a legal lattice transition. Terminal states
    /// reject every transition, including into themselves.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (New, Submitted | Rejected | Cancelled) => true,
            (Submitted, PartiallyFilled | Filled | Cancelled | Rejected | Expired) => true,
            (PartiallyFilled, PartiallyFilled | Filled | Cancelled | Expired) => true,
            _ => false,
        }
    }
}

/// A request to open a new order, produced by a strategy and passed through risk gating before
/// reaching an [`crate::client::ExecutionClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct OrderRequest {
    pub client_order_id: ClientOrderId,
    pub strategy_id: String,
    pub pair: Pair,
    pub side: Side,
    pub kind: OrderKind,
    pub time_in_force: TimeInForce,
    pub quantity: Decimal,
    /// `None` for market orders.
    pub price: Option<Decimal>,
    pub requested_at: Timestamp,
}

/// A request to cancel a previously submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct CancelRequest {
    pub client_order_id: ClientOrderId,
    pub requested_at: Timestamp,
}

/// The full lifecycle record of an order, owned by the [`store::OrderStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub client_order_id: ClientOrderId,
    pub exchange_order_id: Option<ExchangeOrderId>,
    pub strategy_id: String,
    pub pair: Pair,
    pub side: Side,
    pub kind: OrderKind,
    pub time_in_force: TimeInForce,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub filled_quantity: Decimal,
    pub avg_fill_price: Decimal,
    pub status: OrderStatus,
    pub submitted_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    pub fn new(request: OrderRequest) -> Self {
        Self {
            client_order_id: request.client_order_id,
            exchange_order_id: None,
            strategy_id: request.strategy_id,
            pair: request.pair,
            side: request.side,
            kind: request.kind,
            time_in_force: request.time_in_force,
            quantity: request.quantity,
            price: request.price,
            filled_quantity: Decimal::ZERO,
            avg_fill_price: Decimal::ZERO,
            status: OrderStatus::New,
            submitted_at: request.requested_at,
            updated_at: request.requested_at,
        }
    }

    pub fn remaining_quantity(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }

    /// Transitions `self.status` to `next`, returning an error if the lattice forbids it.
    pub fn transition(&mut self, next: OrderStatus, now: Timestamp) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Records a fill of `fill_qty` at `fill_price`, updating the weighted average fill price
    /// and advancing status to `PartiallyFilled` or `Filled`.
    pub fn apply_fill(
        &mut self,
        fill_qty: Decimal,
        fill_price: Decimal,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        if fill_qty.partial_cmp(&self.remaining_quantity()) == Some(std::cmp::Ordering::Greater) {
            return Err(OrderError::OverFill {
                requested: fill_qty,
                remaining: self.remaining_quantity(),
            });
        }
        let prior_filled = self.filled_quantity;
        let new_filled = prior_filled + fill_qty;
        self.avg_fill_price = ((prior_filled * self.avg_fill_price) + (fill_qty * fill_price))
            .checked_div(new_filled)
            .unwrap_or(fill_price);
        self.filled_quantity = new_filled;

        let next = if self.filled_quantity == self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.transition(next, now)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("cannot transition order from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("fill of {requested} exceeds remaining quantity {remaining}")]
    OverFill {
        requested: Decimal,
        remaining: Decimal,
    },
}

/// Outcome of submitting an [`OrderRequest`] to an [`crate::client::ExecutionClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderResult {
    Accepted(Order),
    Rejected {
        client_order_id: ClientOrderId,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_status_rejects_every_transition() {
        assert!(!OrderStatus::Filled.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Rejected.can_transition_to(OrderStatus::New));
    }

    #[test]
    fn partial_then_full_fill_updates_weighted_avg_price() {
        let request = OrderRequest::new(
            ClientOrderId("c1".into()),
            "momentum".into(),
            Pair::parse("BTC/USDT").unwrap(),
            Side::Buy,
            OrderKind::Limit,
            TimeInForce::GoodTilCancel,
            Decimal::from_i64(2),
            Some(Decimal::from_i64(2000)),
            Timestamp::from_millis(0),
        );
        let mut order = Order::new(request);

        order
            .apply_fill(Decimal::from_i64(1), Decimal::from_i64(2000), Timestamp::from_millis(1))
            .unwrap();
        assert_eq!(order.status, OrderStatus::PartiallyFilled);

        order
            .apply_fill(Decimal::from_i64(1), Decimal::from_i64(2100), Timestamp::from_millis(2))
            .unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.avg_fill_price, Decimal::from_i64(2050));
    }

    #[test]
    fn overfill_is_rejected() {
        let request = OrderRequest::new(
            ClientOrderId("c1".into()),
            "momentum".into(),
            Pair::parse("BTC/USDT").unwrap(),
            Side::Buy,
            OrderKind::Market,
            TimeInForce::ImmediateOrCancel,
            Decimal::from_i64(1),
            None,
            Timestamp::from_millis(0),
        );
        let mut order = Order::new(request);
        let err = order
            .apply_fill(Decimal::from_i64(2), Decimal::from_i64(2000), Timestamp::from_millis(1))
            .unwrap_err();
        assert!(matches!(err, OrderError::OverFill { .. }));
    }
}
