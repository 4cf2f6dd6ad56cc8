//! Bar-driven replay of a strategy against a fixed candle series, backed by the simulated
//! execution venue so the same risk/execution flow runs in backtest and in live trading.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;
use tradecore_analytics::metric::drawdown::DrawdownGenerator;
use tradecore_analytics::metric::{ProfitFactor, WinRate};
use tradecore_decimal::{Decimal, Timestamp};
use tradecore_execution::{ExecutionClient, Order, SimulatedExecutor, SimulatedExecutorConfig};
use tradecore_integration::collection::FnvIndexMap;
use tradecore_markets::{Candle, Pair};
use tradecore_risk::{NoRiskManager, RiskGateState, RiskManager};
use tradecore_trader::{MarketDataView, ParameterSet, Strategy, StrategyContext};

use crate::engine::{BlockingOrderExecutor, ExecutionEngine};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub pair: Pair,
    pub timeframe: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub initial_capital: Decimal,
    pub commission_rate: Decimal,
    pub slippage: Decimal,
    pub data_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: Timestamp,
    pub equity: Decimal,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BacktestStatus {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub config: BacktestConfig,
    pub status: BacktestStatus,
    pub trades: Vec<Order>,
    pub equity_curve: Vec<EquityPoint>,
    pub net_profit: Decimal,
    pub win_rate: Option<WinRate>,
    pub profit_factor: Option<ProfitFactor>,
    pub total_return: Decimal,
    pub max_drawdown: Decimal,
}

/// Progress callback invoked at a bounded frequency during a run: `(progress in [0,1],
/// current_bar, total_bars)`.
pub type ProgressCallback<'a> = dyn FnMut(f64, usize, usize) + 'a;

/// Minimal last-price view fed directly from the candle stream being replayed, rather than
/// through a bus subscription — a backtest has no live market-event feed to subscribe to.
#[derive(Debug, Default)]
struct ReplayCache {
    last_price: FnvIndexMap<Pair, Decimal>,
}

impl MarketDataView for ReplayCache {
    fn last_price(&self, pair: &Pair) -> Option<Decimal> {
        self.last_price.get(pair).copied()
    }
}

#[derive(Debug, Default)]
pub struct BacktestEngine;

impl BacktestEngine {
    pub fn new() -> Self {
        Self
    }

    /// Runs `strategy` built from `params` over `candles`, gated through [`NoRiskManager`]. Use
    /// [`Self::run_with_risk`] to gate through a real [`RiskManager`].
    pub fn run<S: Strategy>(
        &self,
        params: &ParameterSet,
        candles: &[Candle],
        config: BacktestConfig,
        progress: Option<&mut ProgressCallback<'_>>,
        should_cancel: Option<&AtomicBool>,
    ) -> BacktestResult {
        self.run_with_risk::<S, NoRiskManager>(params, candles, config, NoRiskManager, progress, should_cancel)
    }

    pub fn run_with_risk<S: Strategy, R: RiskManager<State = RiskGateState>>(
        &self,
        params: &ParameterSet,
        candles: &[Candle],
        config: BacktestConfig,
        risk: R,
        mut progress: Option<&mut ProgressCallback<'_>>,
        should_cancel: Option<&AtomicBool>,
    ) -> BacktestResult {
        let executor = Arc::new(SimulatedExecutor::new(
            SimulatedExecutorConfig {
                slippage_bps: config.slippage,
                commission_rate: config.commission_rate,
                starting_collateral: config.initial_capital,
                leverage: Decimal::ONE,
            },
            config.start_time,
        ));

        let mut engine: ExecutionEngine<SimulatedExecutor, R> = ExecutionEngine::new(risk);
        engine.start(Arc::clone(&executor), config.start_time);

        let mut strategy = S::from_params(params);
        let mut cache = ReplayCache::default();

        let total_bars = candles.len();
        let progress_interval = (total_bars / 100).max(1);
        let mut equity_curve = Vec::with_capacity(total_bars);
        let mut status = BacktestStatus::Completed;

        {
            let mut blocking_executor = BlockingOrderExecutor::new(&mut engine, config.start_time);
            let mut ctx = StrategyContext::new(&cache, &mut blocking_executor, config.start_time);
            strategy.on_start(&mut ctx);
        }

        for (bar_index, candle) in candles.iter().enumerate() {
            if let Some(flag) = should_cancel {
                if flag.load(Ordering::SeqCst) {
                    status = BacktestStatus::Cancelled;
                    break;
                }
            }

            cache.last_price.insert(candle.pair.clone(), candle.close);
            executor.on_price_update(&candle.pair, candle.close, candle.close_time);

            {
                let mut blocking_executor = BlockingOrderExecutor::new(&mut engine, candle.close_time);
                let mut ctx = StrategyContext::new(&cache, &mut blocking_executor, candle.close_time);
                strategy.on_bar(candle, &mut ctx);
            }

            let equity = futures::executor::block_on(executor.account_balances())
                .ok()
                .and_then(|balances| balances.into_iter().next())
                .map(|balance| balance.balance.total)
                .unwrap_or(config.initial_capital);
            equity_curve.push(EquityPoint { timestamp: candle.close_time, equity });

            if let Some(callback) = progress.as_deref_mut() {
                if bar_index % progress_interval == 0 || bar_index + 1 == total_bars {
                    callback((bar_index + 1) as f64 / total_bars.max(1) as f64, bar_index + 1, total_bars);
                }
            }
        }

        if status == BacktestStatus::Completed {
            let mut blocking_executor = BlockingOrderExecutor::new(&mut engine, config.end_time);
            let mut ctx = StrategyContext::new(&cache, &mut blocking_executor, config.end_time);
            strategy.on_stop(&mut ctx);
        }

        if status == BacktestStatus::Cancelled {
            info!("backtest cancelled, discarding partial result");
            return BacktestResult {
                config,
                status,
                trades: Vec::new(),
                equity_curve: Vec::new(),
                net_profit: Decimal::ZERO,
                win_rate: None,
                profit_factor: None,
                total_return: Decimal::ZERO,
                max_drawdown: Decimal::ZERO,
            };
        }

        let stats = executor.statistics();
        let trades = engine.store().history().cloned().collect();
        let net_profit = stats.gross_profit + stats.gross_loss;
        let final_equity = equity_curve.last().map(|p| p.equity).unwrap_or(config.initial_capital);

        let mut drawdown_gen = DrawdownGenerator::new(config.initial_capital, config.start_time);
        for point in &equity_curve {
            drawdown_gen.update(point.equity, point.timestamp);
        }

        BacktestResult {
            status,
            win_rate: WinRate::calculate(stats.winning_trades, stats.total_trades),
            profit_factor: ProfitFactor::calculate(stats.gross_profit, stats.gross_loss.abs()),
            total_return: stats.total_return_pct(config.initial_capital, final_equity),
            max_drawdown: drawdown_gen.max_drawdown_pct(),
            trades,
            equity_curve,
            net_profit,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradecore_execution::order::{OrderKind, OrderRequest, TimeInForce};
    use tradecore_markets::Side;

    struct BuyAndHold {
        bought: bool,
    }

    impl Strategy for BuyAndHold {
        fn from_params(_params: &ParameterSet) -> Self {
            Self { bought: false }
        }

        fn on_bar(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
            if self.bought {
                return;
            }
            self.bought = true;
            ctx.executor.submit(OrderRequest::new(
                tradecore_execution::ClientOrderId("c1".into()),
                "buy-and-hold".into(),
                candle.pair.clone(),
                Side::Buy,
                OrderKind::Market,
                TimeInForce::ImmediateOrCancel,
                Decimal::ONE,
                None,
                ctx.now,
            ));
        }
    }

    fn candle(pair: Pair, ms: i64, close: Decimal) -> Candle {
        Candle {
            pair,
            open_time: Timestamp::from_millis(ms),
            close_time: Timestamp::from_millis(ms + 1000),
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ONE,
        }
    }

    #[test]
    fn buy_and_hold_produces_one_equity_point_per_bar() {
        let pair = Pair::parse("BTC/USDT").unwrap();
        let candles = vec![
            candle(pair.clone(), 0, Decimal::from_i64(100)),
            candle(pair.clone(), 1000, Decimal::from_i64(110)),
            candle(pair.clone(), 2000, Decimal::from_i64(120)),
        ];
        let config = BacktestConfig {
            pair: pair.clone(),
            timeframe: "1m".into(),
            start_time: Timestamp::from_millis(0),
            end_time: Timestamp::from_millis(3000),
            initial_capital: Decimal::from_i64(10_000),
            commission_rate: Decimal::ZERO,
            slippage: Decimal::ZERO,
            data_file: None,
        };
        let result = BacktestEngine::new().run::<BuyAndHold>(&ParameterSet::new(), &candles, config, None, None);
        assert_eq!(result.status, BacktestStatus::Completed);
        assert_eq!(result.equity_curve.len(), 3);
        assert!(!result.trades.is_empty(), "buy-and-hold should have a filled trade in history");
    }

    #[test]
    fn cancel_flag_set_after_first_bar_discards_the_partial_result() {
        let pair = Pair::parse("BTC/USDT").unwrap();
        let candles: Vec<Candle> = (0..150)
            .map(|i| candle(pair.clone(), i * 1000, Decimal::from_i64(100 + i)))
            .collect();
        let config = BacktestConfig {
            pair,
            timeframe: "1m".into(),
            start_time: Timestamp::from_millis(0),
            end_time: Timestamp::from_millis(150_000),
            initial_capital: Decimal::from_i64(10_000),
            commission_rate: Decimal::ZERO,
            slippage: Decimal::ZERO,
            data_file: None,
        };
        let cancel = AtomicBool::new(false);
        let mut calls = 0;
        let mut progress = |_p: f64, _bar: usize, _total: usize| {
            calls += 1;
            cancel.store(true, Ordering::SeqCst);
        };
        let result = BacktestEngine::new().run::<BuyAndHold>(
            &ParameterSet::new(),
            &candles,
            config.clone(),
            Some(&mut progress),
            Some(&cancel),
        );
        assert!(calls >= 1);
        assert_eq!(result.status, BacktestStatus::Cancelled);
        assert!(result.equity_curve.is_empty());
        assert!(config.end_time > config.start_time);
    }
}
