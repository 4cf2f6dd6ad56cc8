//! The strategy capability contract: build from a parameter set, react to each bar, and observe
//! the start/stop of the engine driving it.

use crate::context::StrategyContext;
use crate::parameter::ParameterSet;
use tradecore_markets::Candle;

/// Implemented by every algorithmic strategy pluggable into the backtest or live engine.
///
/// Strategies are constructed from a [`ParameterSet`] rather than built by hand, so the same
/// strategy type can be driven directly or enumerated by the grid-search optimizer.
pub trait Strategy: Send {
    /// Builds a new instance from a resolved parameter set. Called once per backtest run (or
    /// once per optimizer trial), never mid-run.
    fn from_params(params: &ParameterSet) -> Self
    where
        Self: Sized;

    /// Called once before the first bar is delivered.
    fn on_start(&mut self, _ctx: &mut StrategyContext<'_>) {}

    /// Called once per bar with the freshly closed candle. Implementations read `ctx.cache` for
    /// additional context and submit/cancel orders through `ctx.executor`.
    fn on_bar(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>);

    /// Called once after the last bar, or on early engine shutdown.
    fn on_stop(&mut self, _ctx: &mut StrategyContext<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MarketDataView, OrderExecutor};
    use std::cell::RefCell;
    use tradecore_decimal::{Decimal, Timestamp};
    use tradecore_execution::order::{CancelRequest, OrderRequest, OrderResult};
    use tradecore_markets::Pair;

    struct NullCache;
    impl MarketDataView for NullCache {
        fn last_price(&self, _pair: &Pair) -> Option<Decimal> {
            None
        }
    }

    struct RecordingExecutor {
        submissions: RefCell<Vec<OrderRequest>>,
    }
    impl OrderExecutor for RecordingExecutor {
        fn submit(&mut self, request: OrderRequest) -> OrderResult {
            self.submissions.borrow_mut().push(request.clone());
            OrderResult::Accepted(tradecore_execution::order::Order::new(request))
        }
        fn cancel(&mut self, _request: CancelRequest) {}
    }

    struct CountingStrategy {
        bars_seen: usize,
    }

    impl Strategy for CountingStrategy {
        fn from_params(_params: &ParameterSet) -> Self {
            Self { bars_seen: 0 }
        }

        fn on_bar(&mut self, _candle: &Candle, _ctx: &mut StrategyContext<'_>) {
            self.bars_seen += 1;
        }
    }

    #[test]
    fn on_bar_increments_counter() {
        let mut strategy = CountingStrategy::from_params(&ParameterSet::new());
        let cache = NullCache;
        let mut executor = RecordingExecutor { submissions: RefCell::new(Vec::new()) };
        let candle = Candle {
            pair: Pair::new("BTC".to_string(), "USD".to_string()),
            open_time: Timestamp::ZERO,
            close_time: Timestamp::from_millis(60_000),
            open: Decimal::ZERO,
            high: Decimal::ZERO,
            low: Decimal::ZERO,
            close: Decimal::ZERO,
            volume: Decimal::ZERO,
        };
        let mut ctx = StrategyContext::new(&cache, &mut executor, Timestamp::ZERO);
        strategy.on_bar(&candle, &mut ctx);
        strategy.on_bar(&candle, &mut ctx);
        assert_eq!(strategy.bars_seen, 2);
    }
}
