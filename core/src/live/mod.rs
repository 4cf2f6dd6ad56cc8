//! Live trading engines: a synchronous variant driven by explicit `tick()` calls, and an async
//! variant driven by an external event loop's timers. Both own the same composition — cache,
//! data engine, execution engine — and publish `*_engine.started`/`*_engine.stopped`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};
use tradecore_data::DataEngine;
use tradecore_decimal::Timestamp;
use tradecore_execution::ExecutionClient;
use tradecore_integration::bus::topic;
use tradecore_integration::Bus;
use tradecore_risk::RiskGateState;
use tradecore_risk::RiskManager;
use tradecore_trader::StrategyContext;

use crate::cache::MarketCache;
use crate::engine::{BlockingOrderExecutor, ExecutionEngine};
use crate::event::Event;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LiveState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Failed,
}

#[derive(Debug, Error)]
pub enum LiveEngineError {
    #[error("live engine is not running (state: {0:?})")]
    NotRunning(LiveState),
    #[error("pre-flight check failed: {0}")]
    PreflightFailed(String),
}

/// Callback invoked once per tick with a view onto the cache and the order executor. Strategies
/// are free to ignore the candle/bar abstraction entirely here; a live tick may carry any number
/// of underlying market events.
pub type TickCallback<'a> = dyn FnMut(&mut StrategyContext<'_>) + 'a;

/// Owns the bus, cache, data engine, and execution engine for one live trading session, driven
/// one `tick()` at a time by the caller. Not tied to any particular async runtime.
pub struct LiveTradingEngine<C, R> {
    state: LiveState,
    cache: Arc<Mutex<MarketCache>>,
    data_engine: DataEngine,
    execution_engine: ExecutionEngine<C, R>,
    bus: Bus<Event>,
    tick_count: u64,
}

impl<C, R> LiveTradingEngine<C, R>
where
    C: ExecutionClient,
    R: RiskManager<State = RiskGateState>,
{
    pub fn new(data_engine: DataEngine, risk: R) -> Self {
        Self {
            state: LiveState::Stopped,
            cache: Arc::new(Mutex::new(MarketCache::new())),
            data_engine,
            execution_engine: ExecutionEngine::new(risk),
            bus: Bus::new(),
            tick_count: 0,
        }
    }

    pub fn state(&self) -> LiveState {
        self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn cache(&self) -> Arc<Mutex<MarketCache>> {
        Arc::clone(&self.cache)
    }

    /// Runs component pre-flights, wires the cache to the data engine's bus, and transitions to
    /// `running`. On a failed pre-flight the engine goes to the absorbing `failed` state rather
    /// than back to `stopped`, since a caller that ignores the error and calls `tick()` anyway
    /// should see a clear, permanent rejection rather than silently retrying a broken start.
    pub fn start(&mut self, client: Arc<C>, now: Timestamp) -> Result<(), LiveEngineError> {
        self.state = LiveState::Starting;
        if self.data_engine.provider_count() == 0 {
            self.state = LiveState::Failed;
            return Err(LiveEngineError::PreflightFailed("data engine has no providers".into()));
        }

        let cache = Arc::clone(&self.cache);
        self.data_engine.subscribe(Box::new(move |event: &tradecore_data::MarketEvent| {
            cache.lock().update_from_market_event(event);
            Ok(())
        }));
        self.execution_engine.start(client, now);
        self.state = LiveState::Running;
        info!("live trading engine started");
        self.bus.publish(topic::LIVE_ENGINE_STARTED, &Event::EngineStarted { at: now });
        Ok(())
    }

    pub fn stop(&mut self, now: Timestamp) {
        if self.state == LiveState::Stopped {
            return;
        }
        self.state = LiveState::Stopping;
        self.execution_engine.stop(now);
        self.state = LiveState::Stopped;
        info!("live trading engine stopped");
        self.bus.publish(topic::LIVE_ENGINE_STOPPED, &Event::EngineStopped { at: now });
        self.bus.deinit();
    }

    /// Polls the data engine once, runs `on_tick` against the cache and a blocking order
    /// executor, and publishes `system.tick`.
    pub fn tick(&mut self, now: Timestamp, on_tick: &mut TickCallback<'_>) -> Result<(), LiveEngineError> {
        if self.state != LiveState::Running {
            return Err(LiveEngineError::NotRunning(self.state));
        }
        futures::executor::block_on(self.data_engine.poll_once());
        self.tick_count += 1;

        let cache = self.cache.lock();
        let mut blocking_executor = BlockingOrderExecutor::new(&mut self.execution_engine, now);
        let mut ctx = StrategyContext::new(&*cache, &mut blocking_executor, now);
        on_tick(&mut ctx);
        drop(cache);

        self.bus.publish(topic::SYSTEM_TICK, &Event::Tick { timestamp: now, tick_number: self.tick_count });
        Ok(())
    }

    pub fn run_ticks(&mut self, n: usize, now: Timestamp, mut on_tick: impl FnMut(&mut StrategyContext<'_>)) -> Result<usize, LiveEngineError> {
        let mut ran = 0;
        for _ in 0..n {
            if self.state != LiveState::Running {
                break;
            }
            self.tick(now, &mut on_tick)?;
            ran += 1;
        }
        Ok(ran)
    }
}

/// Same composition as [`LiveTradingEngine`], driven instead by two `tokio` interval timers.
/// Cancellation is cooperative: `stop()` flips `running` to `false`, and the next time either
/// timer fires it observes the flag and disarms instead of re-arming.
pub struct AsyncLiveTradingEngine {
    running: Arc<AtomicBool>,
    tick_count: Arc<AtomicU64>,
    tick_interval: Duration,
    heartbeat_interval: Duration,
}

impl AsyncLiveTradingEngine {
    pub fn new(tick_interval_ms: u64, heartbeat_interval_ms: u64) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            tick_count: Arc::new(AtomicU64::new(0)),
            tick_interval: Duration::from_millis(tick_interval_ms),
            heartbeat_interval: Duration::from_millis(heartbeat_interval_ms),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::SeqCst)
    }

    /// Spawns the tick and heartbeat timers as `tokio` tasks. `on_tick`/`on_heartbeat` run on the
    /// runtime's executor, not a dedicated thread; they must not block.
    pub fn start<FT, FH>(&self, mut on_tick: FT, mut on_heartbeat: FH)
    where
        FT: FnMut(u64) + Send + 'static,
        FH: FnMut() + Send + 'static,
    {
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let tick_count = Arc::clone(&self.tick_count);
        let tick_interval = self.tick_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            loop {
                interval.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let n = tick_count.fetch_add(1, Ordering::SeqCst) + 1;
                on_tick(n);
            }
        });

        let running = Arc::clone(&self.running);
        let heartbeat_interval = self.heartbeat_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(heartbeat_interval);
            loop {
                interval.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                on_heartbeat();
            }
        });

        info!("async live trading engine started");
    }

    /// Flips the cooperative cancellation flag. The timers observe it on their next tick and
    /// disarm instead of re-arming; this returns immediately without waiting for them to exit.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        warn!("async live trading engine stop requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tradecore_execution::order::{CancelRequest, ClientOrderId, ExecutionClientError, OrderRequest, OrderResult, OrderStatus};
    use tradecore_execution::{AssetBalance, Balance, Order};
    use tradecore_risk::NoRiskManager;

    struct StubClient;

    #[async_trait]
    impl ExecutionClient for StubClient {
        async fn open_order(&self, request: OrderRequest) -> Result<OrderResult, ExecutionClientError> {
            Ok(OrderResult::Accepted(Order::new(request)))
        }
        async fn cancel_order(&self, _request: CancelRequest) -> Result<(), ExecutionClientError> {
            Ok(())
        }
        async fn cancel_all_orders(&self, _now: Timestamp) -> Result<Vec<ClientOrderId>, ExecutionClientError> {
            Ok(Vec::new())
        }
        async fn account_balances(&self) -> Result<Vec<AssetBalance>, ExecutionClientError> {
            Ok(vec![AssetBalance::new(
                "USD".into(),
                Balance::new(tradecore_decimal::Decimal::ZERO, tradecore_decimal::Decimal::ZERO),
                Timestamp::ZERO,
            )])
        }
        async fn get_order_status(&self, _client_order_id: &ClientOrderId) -> Result<Option<OrderStatus>, ExecutionClientError> {
            Ok(None)
        }
    }

    #[test]
    fn starting_with_no_providers_fails_preflight_and_transitions_to_failed() {
        let mut engine: LiveTradingEngine<StubClient, NoRiskManager> = LiveTradingEngine::new(DataEngine::new(), NoRiskManager);
        let result = engine.start(Arc::new(StubClient), Timestamp::ZERO);
        assert!(result.is_err());
        assert_eq!(engine.state(), LiveState::Failed);
    }

    #[test]
    fn tick_before_start_is_rejected() {
        let mut engine: LiveTradingEngine<StubClient, NoRiskManager> = LiveTradingEngine::new(DataEngine::new(), NoRiskManager);
        let result = engine.tick(Timestamp::ZERO, &mut |_ctx| {});
        assert!(matches!(result, Err(LiveEngineError::NotRunning(LiveState::Stopped))));
    }

    #[test]
    fn async_engine_starts_unarmed_and_stop_flips_the_flag() {
        let engine = AsyncLiveTradingEngine::new(10, 1000);
        assert!(!engine.is_running());
        engine.stop();
        assert!(!engine.is_running());
    }
}
