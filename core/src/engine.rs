//! Orchestrates risk gating, the dual-indexed order store, and a venue [`ExecutionClient`]
//! behind one state machine. This is the only place in the workspace that sees all three at
//! once, which is why it lives in `core` rather than `execution` or `risk`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use tradecore_decimal::{Decimal, Timestamp};
use tradecore_execution::order::store::{OrderStore, OrderStoreError};
use tradecore_execution::{
    CancelRequest, ClientOrderId, ExecutionClient, Order, OrderRequest,
    OrderResult, OrderStatus,
};
use tradecore_integration::bus::topic;
use tradecore_integration::Bus;
use tradecore_risk::{RiskGateState, RiskManager};
use tradecore_trader::OrderExecutor;

use crate::event::Event;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EngineState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("execution engine is not running (state: {0:?})")]
    NotRunning(EngineState),
}

/// Outcome of submitting a single order through the engine: accepted by the venue, refused
/// before ever reaching it by risk gating, or rolled back after a venue transport failure.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    Accepted(Order),
    RiskRefused {
        client_order_id: ClientOrderId,
        reason: String,
    },
    ClientError {
        client_order_id: ClientOrderId,
        reason: String,
    },
}

/// Drives one execution venue through its lifecycle: `start` hands it a client, `submit_order`/
/// `cancel_order` route requests through risk gating and the order store, and `stop` tears
/// everything down. `R` is the pre-trade risk manager; swap in [`tradecore_risk::NoRiskManager`]
/// to bypass gating entirely.
pub struct ExecutionEngine<C, R> {
    state: EngineState,
    client: Option<Arc<C>>,
    risk: R,
    risk_state: RiskGateState,
    store: OrderStore,
    bus: Bus<Event>,
}

impl<C, R> ExecutionEngine<C, R>
where
    C: ExecutionClient,
    R: RiskManager<State = RiskGateState>,
{
    pub fn new(risk: R) -> Self {
        Self {
            state: EngineState::Stopped,
            client: None,
            risk,
            risk_state: RiskGateState::default(),
            store: OrderStore::new(),
            bus: Bus::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn subscribe(&mut self, topic: impl Into<String>, subscriber: tradecore_integration::Subscriber<Event>) {
        self.bus.subscribe(topic, subscriber);
    }

    /// Transitions `stopped -> running`, wiring in the venue client to submit orders against.
    pub fn start(&mut self, client: Arc<C>, now: Timestamp) {
        self.client = Some(client);
        self.state = EngineState::Running;
        info!("execution engine started");
        self.bus.publish(topic::EXECUTION_ENGINE_STARTED, &Event::EngineStarted { at: now });
    }

    pub fn pause(&mut self) {
        if self.state == EngineState::Running {
            self.state = EngineState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == EngineState::Paused {
            self.state = EngineState::Running;
        }
    }

    /// Transitions to `stopped` from any state, dropping the venue client and clearing bus
    /// subscriptions. Orders already tracked in the store are left untouched; call
    /// [`Self::cancel_all_orders`] first if they should be cancelled on shutdown.
    pub fn stop(&mut self, now: Timestamp) {
        self.client = None;
        self.state = EngineState::Stopped;
        info!("execution engine stopped");
        self.bus.publish(topic::EXECUTION_ENGINE_STOPPED, &Event::EngineStopped { at: now });
        self.bus.deinit();
    }

    /// Runs `request` through risk gating, tracks it in the order store, then submits it to the
    /// venue. On a venue transport error the store entry is withdrawn (never having truly existed
    /// at the venue) rather than moved to history.
    pub async fn submit_order(&mut self, request: OrderRequest, now: Timestamp) -> Result<OrderOutcome, EngineError> {
        let Some(client) = self.client.clone() else {
            return Err(EngineError::NotRunning(self.state));
        };
        if self.state != EngineState::Running {
            return Err(EngineError::NotRunning(self.state));
        }

        let client_order_id = request.client_order_id.clone();
        let pair = request.pair.clone();
        let strategy_id = request.strategy_id.clone();

        let (_, approved_opens, _, refused_opens) = self.risk.check(&self.risk_state, std::iter::empty(), std::iter::once(request));
        if let Some(refused) = refused_opens.into_iter().next() {
            self.bus.publish(
                topic::ORDER_REJECTED,
                &Event::OrderRejected { client_order_id: client_order_id.clone(), reason: refused.reason.clone() },
            );
            return Ok(OrderOutcome::RiskRefused { client_order_id, reason: refused.reason });
        }
        let Some(approved) = approved_opens.into_iter().next() else {
            return Ok(OrderOutcome::RiskRefused {
                client_order_id,
                reason: "risk gate returned neither an approval nor a refusal".into(),
            });
        };
        let request = approved.into_item();

        let order = Order::new(request.clone());
        if let Err(OrderStoreError::Duplicate(_)) = self.store.insert_new(order) {
            let reason = "duplicate client order id".to_string();
            self.bus.publish(
                topic::ORDER_REJECTED,
                &Event::OrderRejected { client_order_id: client_order_id.clone(), reason: reason.clone() },
            );
            return Ok(OrderOutcome::RiskRefused { client_order_id, reason });
        }

        match client.open_order(request).await {
            Ok(OrderResult::Accepted(order)) => {
                self.risk_state.open_order_count += 1;
                self.risk_state.last_order_time.insert(strategy_id, now);
                if let Some(exchange_order_id) = order.exchange_order_id.clone() {
                    let _ = self.store.acknowledge(&client_order_id, exchange_order_id, now);
                }
                if order.filled_quantity > Decimal::ZERO {
                    let _ = self.store.apply_fill(&client_order_id, order.filled_quantity, order.avg_fill_price, now);
                }
                self.bus.publish(
                    topic::ORDER_SUBMITTED,
                    &Event::OrderSubmitted { client_order_id: client_order_id.clone(), pair },
                );
                Ok(OrderOutcome::Accepted(order))
            }
            Ok(OrderResult::Rejected { client_order_id, reason }) => {
                self.store.withdraw(&client_order_id);
                self.bus.publish(
                    topic::ORDER_REJECTED,
                    &Event::OrderRejected { client_order_id: client_order_id.clone(), reason: reason.clone() },
                );
                Ok(OrderOutcome::RiskRefused { client_order_id, reason })
            }
            Err(error) => {
                self.store.withdraw(&client_order_id);
                warn!(%client_order_id, %error, "venue transport error, withdrawing order");
                let reason = error.to_string();
                self.bus.publish(
                    topic::ORDER_REJECTED,
                    &Event::OrderRejected { client_order_id: client_order_id.clone(), reason: reason.clone() },
                );
                Ok(OrderOutcome::ClientError { client_order_id, reason })
            }
        }
    }

    pub async fn cancel_order(&mut self, request: CancelRequest, now: Timestamp) -> Result<(), EngineError> {
        let Some(client) = self.client.clone() else {
            return Err(EngineError::NotRunning(self.state));
        };
        let client_order_id = request.client_order_id.clone();
        if let Err(error) = client.cancel_order(request).await {
            warn!(%client_order_id, %error, "venue rejected cancel request");
            return Ok(());
        }
        let _ = self.store.cancel(&client_order_id, now);
        self.bus.publish(topic::ORDER_CANCELLED, &Event::OrderCancelled { client_order_id });
        Ok(())
    }

    pub async fn cancel_all_orders(&mut self, now: Timestamp) -> Result<Vec<ClientOrderId>, EngineError> {
        let Some(client) = self.client.clone() else {
            return Err(EngineError::NotRunning(self.state));
        };
        match client.cancel_all_orders(now).await {
            Ok(cancelled) => {
                for id in &cancelled {
                    let _ = self.store.cancel(id, now);
                    self.bus.publish(topic::ORDER_CANCELLED, &Event::OrderCancelled { client_order_id: id.clone() });
                }
                Ok(cancelled)
            }
            Err(error) => {
                warn!(%error, "venue rejected cancel-all request");
                Ok(Vec::new())
            }
        }
    }

    /// Reconciles every active order against the venue's own record of it, in case the engine
    /// restarted after a crash. An order the venue has no record of is left active; a caller that
    /// wants stricter recovery semantics should cancel and resubmit it.
    pub async fn recover_orders(&mut self, now: Timestamp) -> Result<usize, EngineError> {
        let Some(client) = self.client.clone() else {
            return Err(EngineError::NotRunning(self.state));
        };
        let active_ids: Vec<ClientOrderId> = self.store.active_orders().map(|o| o.client_order_id.clone()).collect();
        let mut recovered = 0;
        for id in active_ids {
            match client.get_order_status(&id).await {
                Ok(Some(OrderStatus::Filled)) => {
                    let _ = self.store.mark_filled(&id, now);
                    recovered += 1;
                }
                Ok(Some(OrderStatus::Cancelled | OrderStatus::Rejected | OrderStatus::Expired)) => {
                    let _ = self.store.cancel(&id, now);
                    recovered += 1;
                }
                Ok(_) => {}
                Err(error) => warn!(%id, %error, "failed to query order status during recovery"),
            }
        }
        self.bus.publish(topic::EXECUTION_ENGINE_RECOVERY_COMPLETE, &Event::RecoveryComplete { recovered });
        Ok(recovered)
    }

    /// Sweeps the store for active orders older than `timeout_ms`, cancelling each at the venue.
    pub async fn check_timeout_orders(&mut self, now: Timestamp, timeout_ms: i64) -> Result<usize, EngineError> {
        let stale = self.store.timed_out(now, timeout_ms);
        let count = stale.len();
        for id in stale {
            let _ = self.cancel_order(CancelRequest::new(id, now), now).await;
        }
        self.bus.publish(topic::EXECUTION_ENGINE_TIMEOUT_CHECK, &Event::TimeoutCheck { timed_out: count });
        Ok(count)
    }
}

/// Blocking [`OrderExecutor`] facade over an [`ExecutionEngine`], for strategy contexts that run
/// outside an async runtime (the synchronous backtest loop, the synchronous live engine). Safe
/// because every venue this workspace ships (`SimulatedExecutor`) never actually suspends.
pub struct BlockingOrderExecutor<'a, C, R> {
    engine: &'a mut ExecutionEngine<C, R>,
    now: Timestamp,
}

impl<'a, C, R> BlockingOrderExecutor<'a, C, R> {
    pub fn new(engine: &'a mut ExecutionEngine<C, R>, now: Timestamp) -> Self {
        Self { engine, now }
    }
}

impl<'a, C, R> OrderExecutor for BlockingOrderExecutor<'a, C, R>
where
    C: ExecutionClient,
    R: RiskManager<State = RiskGateState>,
{
    fn submit(&mut self, request: OrderRequest) -> OrderResult {
        let client_order_id = request.client_order_id.clone();
        match futures::executor::block_on(self.engine.submit_order(request, self.now)) {
            Ok(OrderOutcome::Accepted(order)) => OrderResult::Accepted(order),
            Ok(OrderOutcome::RiskRefused { client_order_id, reason }) => OrderResult::Rejected { client_order_id, reason },
            Ok(OrderOutcome::ClientError { client_order_id, reason }) => OrderResult::Rejected { client_order_id, reason },
            Err(error) => OrderResult::Rejected { client_order_id, reason: error.to_string() },
        }
    }

    fn cancel(&mut self, request: CancelRequest) {
        let _ = futures::executor::block_on(self.engine.cancel_order(request, self.now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tradecore_execution::{AssetBalance, Balance, OrderKind, TimeInForce};
    use tradecore_markets::{Pair, Side};
    use tradecore_risk::NoRiskManager;

    struct StubClient {
        next_exchange_id: AtomicU64,
        fail: bool,
    }

    impl StubClient {
        fn new(fail: bool) -> Self {
            Self { next_exchange_id: AtomicU64::new(1), fail }
        }
    }

    #[async_trait]
    impl ExecutionClient for StubClient {
        async fn open_order(&self, request: OrderRequest) -> Result<OrderResult, ExecutionClientError> {
            if self.fail {
                return Err(ExecutionClientError::Transport("connection reset".into()));
            }
            let mut order = Order::new(request);
            let id = self.next_exchange_id.fetch_add(1, Ordering::Relaxed);
            order.exchange_order_id = Some(tradecore_execution::ExchangeOrderId(format!("e{id}")));
            Ok(OrderResult::Accepted(order))
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

    fn request(id: &str) -> OrderRequest {
        OrderRequest::new(
            ClientOrderId(id.into()),
            "momentum".into(),
            Pair::parse("BTC/USDT").unwrap(),
            Side::Buy,
            OrderKind::Market,
            TimeInForce::ImmediateOrCancel,
            tradecore_decimal::Decimal::from_i64(1),
            None,
            Timestamp::from_millis(0),
        )
    }

    #[tokio::test]
    async fn submit_order_while_stopped_is_an_error() {
        let mut engine: ExecutionEngine<StubClient, NoRiskManager> = ExecutionEngine::new(NoRiskManager);
        let result = engine.submit_order(request("c1"), Timestamp::from_millis(0)).await;
        assert!(matches!(result, Err(EngineError::NotRunning(EngineState::Stopped))));
    }

    #[tokio::test]
    async fn accepted_order_is_tracked_active_and_published() {
        let mut engine: ExecutionEngine<StubClient, NoRiskManager> = ExecutionEngine::new(NoRiskManager);
        engine.start(Arc::new(StubClient::new(false)), Timestamp::from_millis(0));

        let outcome = engine.submit_order(request("c1"), Timestamp::from_millis(1)).await.unwrap();
        assert!(matches!(outcome, OrderOutcome::Accepted(_)));
        assert_eq!(engine.store().active_count(), 1);
    }

    #[tokio::test]
    async fn client_transport_error_withdraws_the_order_from_the_store() {
        let mut engine: ExecutionEngine<StubClient, NoRiskManager> = ExecutionEngine::new(NoRiskManager);
        engine.start(Arc::new(StubClient::new(true)), Timestamp::from_millis(0));

        let outcome = engine.submit_order(request("c1"), Timestamp::from_millis(1)).await.unwrap();
        assert!(matches!(outcome, OrderOutcome::ClientError { .. }));
        assert_eq!(engine.store().active_count(), 0);
        assert_eq!(engine.store().history_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_client_order_id_is_refused_without_reaching_the_venue() {
        let mut engine: ExecutionEngine<StubClient, NoRiskManager> = ExecutionEngine::new(NoRiskManager);
        engine.start(Arc::new(StubClient::new(false)), Timestamp::from_millis(0));

        engine.submit_order(request("c1"), Timestamp::from_millis(1)).await.unwrap();
        let outcome = engine.submit_order(request("c1"), Timestamp::from_millis(2)).await.unwrap();
        assert!(matches!(outcome, OrderOutcome::RiskRefused { .. }));
    }
}
