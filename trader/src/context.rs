//! The view a [`crate::strategy::Strategy`] callback gets of the outside world. Defined as
//! traits rather than concrete types so this crate never needs to depend on the engine crate
//! that owns the real cache and executor (`tradecore-core`), which in turn depends on this
//! crate's [`crate::strategy::Strategy`] trait.

use tradecore_decimal::{Decimal, Timestamp};
use tradecore_execution::order::{CancelRequest, OrderRequest, OrderResult};
use tradecore_markets::Pair;

/// Read-only market data access, implemented by the live cache and by the backtest engine's
/// replay buffer alike.
pub trait MarketDataView {
    fn last_price(&self, pair: &Pair) -> Option<Decimal>;
}

/// The order-routing half of a strategy's context: submit and cancel, without exposing which
/// concrete execution client or simulated venue is behind it.
pub trait OrderExecutor {
    fn submit(&mut self, request: OrderRequest) -> OrderResult;
    fn cancel(&mut self, request: CancelRequest);
}

/// Everything a [`crate::strategy::Strategy`] callback can see and act on during one invocation.
pub struct StrategyContext<'a> {
    pub cache: &'a dyn MarketDataView,
    pub executor: &'a mut dyn OrderExecutor,
    pub now: Timestamp,
}

impl<'a> StrategyContext<'a> {
    pub fn new(cache: &'a dyn MarketDataView, executor: &'a mut dyn OrderExecutor, now: Timestamp) -> Self {
        Self { cache, executor, now }
    }
}
