#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity)]

//! # Risk - Pre-Trade Risk Gating
//!
//! Reviews the cancel/open order requests a strategy wants to submit before they reach an
//! [`execution::client::ExecutionClient`], approving or refusing each one individually so a
//! single bad request never blocks the rest of a batch.

use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tradecore_decimal::{Decimal, Timestamp};
use tradecore_execution::{CancelRequest, OrderRequest};
use tradecore_integration::collection::FnvIndexMap;

/// An item that passed every risk check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Constructor)]
pub struct RiskApproved<T>(pub T);

impl<T> RiskApproved<T> {
    pub fn into_item(self) -> T {
        self.0
    }
}

/// An item a risk check rejected, carrying the human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiskRefused<T> {
    pub item: T,
    pub reason: String,
}

impl<T> RiskRefused<T> {
    pub fn new(item: T, reason: impl Into<String>) -> Self {
        Self {
            item,
            reason: reason.into(),
        }
    }

    pub fn into_item(self) -> T {
        self.item
    }
}

/// Reviews and filters the cancel/open requests a strategy wants to submit.
pub trait RiskManager {
    type State;

    #[allow(clippy::type_complexity)]
    fn check(
        &self,
        state: &Self::State,
        cancels: impl IntoIterator<Item = CancelRequest>,
        opens: impl IntoIterator<Item = OrderRequest>,
    ) -> (
        Vec<RiskApproved<CancelRequest>>,
        Vec<RiskApproved<OrderRequest>>,
        Vec<RiskRefused<CancelRequest>>,
        Vec<RiskRefused<OrderRequest>>,
    );
}

/// Pass-through risk manager that approves every request. Useful for tests and for strategies
/// that implement their own risk controls upstream.
#[derive(Debug, Clone, Default)]
pub struct NoRiskManager;

impl RiskManager for NoRiskManager {
    type State = ();

    fn check(
        &self,
        _state: &Self::State,
        cancels: impl IntoIterator<Item = CancelRequest>,
        opens: impl IntoIterator<Item = OrderRequest>,
    ) -> (
        Vec<RiskApproved<CancelRequest>>,
        Vec<RiskApproved<OrderRequest>>,
        Vec<RiskRefused<CancelRequest>>,
        Vec<RiskRefused<OrderRequest>>,
    ) {
        (
            cancels.into_iter().map(RiskApproved::new).collect(),
            opens.into_iter().map(RiskApproved::new).collect(),
            Vec::new(),
            Vec::new(),
        )
    }
}

/// Snapshot of engine state a [`RiskGate`] needs to evaluate `opens` against: how many orders
/// are already active, and when each strategy last had an order accepted.
#[derive(Debug, Clone, Default)]
pub struct RiskGateState {
    pub open_order_count: usize,
    pub last_order_time: FnvIndexMap<String, Timestamp>,
}

/// Configurable pre-trade risk checks: minimum spacing between orders from the same strategy,
/// a maximum single-order size, a ceiling on the number of orders open at once, and an allowlist
/// of tradable symbols.
#[derive(Debug, Clone)]
pub struct RiskGateConfig {
    pub min_order_interval_ms: i64,
    pub max_order_size: Decimal,
    pub max_open_orders: usize,
    pub allowed_symbols: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RiskGate {
    config: RiskGateConfig,
}

impl RiskGate {
    pub fn new(config: RiskGateConfig) -> Self {
        Self { config }
    }

    fn check_open(&self, state: &RiskGateState, provisional_open_count: usize, request: &OrderRequest) -> Option<String> {
        if let Some(last) = state.last_order_time.get(&request.strategy_id) {
            let elapsed = request.requested_at.millis() - last.millis();
            if elapsed < self.config.min_order_interval_ms {
                return Some(format!(
                    "strategy {} submitted an order {elapsed}ms ago, below min_order_interval_ms {}",
                    request.strategy_id, self.config.min_order_interval_ms
                ));
            }
        }
        if request.quantity.partial_cmp(&self.config.max_order_size) == Some(std::cmp::Ordering::Greater) {
            return Some(format!(
                "order quantity {} exceeds max order size {}",
                request.quantity, self.config.max_order_size
            ));
        }
        if provisional_open_count >= self.config.max_open_orders {
            return Some(format!(
                "open order count would reach {}, exceeding max_open_orders {}",
                provisional_open_count + 1,
                self.config.max_open_orders
            ));
        }
        let symbol = request.pair.to_string();
        if !self.config.allowed_symbols.is_empty() && !self.config.allowed_symbols.iter().any(|s| s == &symbol) {
            return Some(format!("symbol {symbol} is not in the allowed list"));
        }
        None
    }
}

impl RiskManager for RiskGate {
    type State = RiskGateState;

    fn check(
        &self,
        state: &Self::State,
        cancels: impl IntoIterator<Item = CancelRequest>,
        opens: impl IntoIterator<Item = OrderRequest>,
    ) -> (
        Vec<RiskApproved<CancelRequest>>,
        Vec<RiskApproved<OrderRequest>>,
        Vec<RiskRefused<CancelRequest>>,
        Vec<RiskRefused<OrderRequest>>,
    ) {
        // Cancels are never risk-gated: reducing exposure is always allowed.
        let approved_cancels = cancels.into_iter().map(RiskApproved::new).collect();

        let mut approved_opens = Vec::new();
        let mut refused_opens = Vec::new();
        let mut provisional_open_count = state.open_order_count;

        for request in opens {
            match self.check_open(state, provisional_open_count, &request) {
                Some(reason) => {
                    debug!(strategy = %request.strategy_id, %reason, "risk gate refused order");
                    refused_opens.push(RiskRefused::new(request, reason));
                }
                None => {
                    provisional_open_count += 1;
                    approved_opens.push(RiskApproved::new(request));
                }
            }
        }

        (approved_cancels, approved_opens, Vec::new(), refused_opens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradecore_execution::{ClientOrderId, OrderKind, TimeInForce};
    use tradecore_markets::{Pair, Side};

    fn request(strategy: &str, qty: i64, at_ms: i64) -> OrderRequest {
        OrderRequest::new(
            ClientOrderId(format!("c-{at_ms}")),
            strategy.into(),
            Pair::parse("BTC/USDT").unwrap(),
            Side::Buy,
            OrderKind::Market,
            TimeInForce::ImmediateOrCancel,
            Decimal::from_i64(qty),
            None,
            Timestamp::from_millis(at_ms),
        )
    }

    #[test]
    fn order_exceeding_max_size_is_refused() {
        let gate = RiskGate::new(RiskGateConfig {
            min_order_interval_ms: 0,
            max_order_size: Decimal::from_i64(10),
            max_open_orders: 100,
            allowed_symbols: vec![],
        });
        let state = RiskGateState::default();
        let (_, approved, _, refused) = gate.check(&state, vec![], vec![request("s1", 20, 0)]);
        assert!(approved.is_empty());
        assert_eq!(refused.len(), 1);
    }

    #[test]
    fn symbol_not_in_allowlist_is_refused() {
        let gate = RiskGate::new(RiskGateConfig {
            min_order_interval_ms: 0,
            max_order_size: Decimal::from_i64(100),
            max_open_orders: 100,
            allowed_symbols: vec!["ETH/USDT".into()],
        });
        let state = RiskGateState::default();
        let (_, approved, _, refused) = gate.check(&state, vec![], vec![request("s1", 1, 0)]);
        assert!(approved.is_empty());
        assert_eq!(refused.len(), 1);
    }

    #[test]
    fn orders_within_a_batch_count_toward_max_open_orders() {
        let gate = RiskGate::new(RiskGateConfig {
            min_order_interval_ms: 0,
            max_order_size: Decimal::from_i64(100),
            max_open_orders: 1,
            allowed_symbols: vec![],
        });
        let state = RiskGateState::default();
        let (_, approved, _, refused) = gate.check(
            &state,
            vec![],
            vec![request("s1", 1, 0), request("s1", 1, 1)],
        );
        assert_eq!(approved.len(), 1);
        assert_eq!(refused.len(), 1);
    }

    #[test]
    fn order_too_soon_after_the_last_is_refused() {
        let gate = RiskGate::new(RiskGateConfig {
            min_order_interval_ms: 1_000,
            max_order_size: Decimal::from_i64(100),
            max_open_orders: 100,
            allowed_symbols: vec![],
        });
        let mut state = RiskGateState::default();
        state
            .last_order_time
            .insert("s1".to_string(), Timestamp::from_millis(0));

        let (_, approved, _, refused) = gate.check(&state, vec![], vec![request("s1", 1, 500)]);
        assert!(approved.is_empty());
        assert_eq!(refused.len(), 1);
    }

    #[test]
    fn cancels_are_never_risk_gated() {
        let gate = RiskGate::new(RiskGateConfig {
            min_order_interval_ms: 0,
            max_order_size: Decimal::ZERO,
            max_open_orders: 0,
            allowed_symbols: vec![],
        });
        let state = RiskGateState::default();
        let cancel = CancelRequest::new(ClientOrderId("c1".into()), Timestamp::from_millis(0));
        let (approved_cancels, _, _, _) = gate.check(&state, vec![cancel], vec![]);
        assert_eq!(approved_cancels.len(), 1);
    }
}
