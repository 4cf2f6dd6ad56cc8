//! A simulated execution venue for backtesting and paper trading: fills orders against the
//! latest known mark price with configurable slippage and commission, and tracks the resulting
//! account (positions, free collateral) and running trade statistics.

use crate::balance::AssetBalance;
use crate::client::{ExecutionClient, ExecutionClientError};
use crate::order::store::OrderStore;
use crate::order::{
    CancelRequest, ClientOrderId, ExchangeOrderId, Order, OrderKind, OrderRequest, OrderResult,
    OrderStatus,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tracing::{debug, warn};
use tradecore_decimal::{Decimal, Timestamp};
use tradecore_integration::collection::FnvIndexMap;
use tradecore_markets::{Account, Leverage, Pair, Position, Side};

#[derive(Debug, Clone, Copy)]
pub struct SimulatedExecutorConfig {
    /// One-sided slippage applied to market fills, in basis points of the mark price.
    pub slippage_bps: Decimal,
    /// Commission rate applied to the notional of every fill.
    pub commission_rate: Decimal,
    pub starting_collateral: Decimal,
    pub leverage: Decimal,
}

impl Default for SimulatedExecutorConfig {
    fn default() -> Self {
        Self {
            slippage_bps: Decimal::ZERO,
            commission_rate: Decimal::ZERO,
            starting_collateral: Decimal::from_i64(10_000),
            leverage: Decimal::ONE,
        }
    }
}

/// Running trade statistics accumulated as the simulated account realizes PnL.
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeStatistics {
    pub total_trades: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub total_commission: Decimal,
    pub peak_equity: Decimal,
    pub max_drawdown: Decimal,
}

impl TradeStatistics {
    fn record_realized_pnl(&mut self, pnl: Decimal) {
        self.total_trades += 1;
        if pnl.is_sign_positive() && !pnl.is_zero() {
            self.winning_trades += 1;
            self.gross_profit = self.gross_profit + pnl;
        } else if pnl.is_sign_negative() {
            self.losing_trades += 1;
            self.gross_loss = self.gross_loss + pnl;
        }
    }

    fn record_commission(&mut self, commission: Decimal) {
        self.total_commission = self.total_commission + commission;
    }

    /// Updates the running peak/drawdown watermark from a fresh equity reading.
    fn update_equity(&mut self, equity: Decimal) {
        if equity.partial_cmp(&self.peak_equity) == Some(std::cmp::Ordering::Greater) {
            self.peak_equity = equity;
        }
        if !self.peak_equity.is_zero() {
            let drawdown = (self.peak_equity - equity)
                .checked_div(self.peak_equity)
                .unwrap_or(Decimal::ZERO);
            if drawdown.partial_cmp(&self.max_drawdown) == Some(std::cmp::Ordering::Greater) {
                self.max_drawdown = drawdown;
            }
        }
    }

    pub fn win_rate(&self) -> Decimal {
        if self.total_trades == 0 {
            return Decimal::ZERO;
        }
        Decimal::from_i64(self.winning_trades as i64)
            .checked_div(Decimal::from_i64(self.total_trades as i64))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn avg_win(&self) -> Decimal {
        if self.winning_trades == 0 {
            return Decimal::ZERO;
        }
        self.gross_profit
            .checked_div(Decimal::from_i64(self.winning_trades as i64))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn avg_loss(&self) -> Decimal {
        if self.losing_trades == 0 {
            return Decimal::ZERO;
        }
        self.gross_loss
            .checked_div(Decimal::from_i64(self.losing_trades as i64))
            .unwrap_or(Decimal::ZERO)
    }

    /// Ratio of gross profit to gross loss magnitude. `NaN` when there have been no losses to
    /// divide by, matching `Decimal`'s zero-divisor error contract turned into a sentinel here.
    pub fn profit_factor(&self) -> Decimal {
        let gross_loss_abs = self.gross_loss.abs();
        if gross_loss_abs.is_zero() {
            return Decimal::NAN;
        }
        self.gross_profit
            .checked_div(gross_loss_abs)
            .unwrap_or(Decimal::NAN)
    }

    pub fn total_return_pct(&self, starting_equity: Decimal, current_equity: Decimal) -> Decimal {
        if starting_equity.is_zero() {
            return Decimal::ZERO;
        }
        (current_equity - starting_equity)
            .checked_div(starting_equity)
            .unwrap_or(Decimal::ZERO)
    }
}

struct SimulatedState {
    store: OrderStore,
    account: Account,
    marks: FnvIndexMap<Pair, Decimal>,
    stats: TradeStatistics,
}

/// Simulated order-execution venue: fills against the latest mark price known for a pair,
/// applying the configured slippage and commission, and feeding every fill into a
/// [`markets::Account`] so PnL accounting matches a live venue exactly.
pub struct SimulatedExecutor {
    config: SimulatedExecutorConfig,
    state: Mutex<SimulatedState>,
    next_exchange_id: AtomicU64,
}

impl SimulatedExecutor {
    pub fn new(config: SimulatedExecutorConfig, now: Timestamp) -> Self {
        Self {
            state: Mutex::new(SimulatedState {
                store: OrderStore::new(),
                account: Account::new("simulated", config.starting_collateral, now),
                marks: FnvIndexMap::default(),
                stats: TradeStatistics::default(),
            }),
            config,
            next_exchange_id: AtomicU64::new(1),
        }
    }

    /// Feeds a fresh mark price for `pair`, marking the account's open position (if any) and
    /// attempting to fill any resting limit order that price has made marketable.
    pub fn on_price_update(&self, pair: &Pair, price: Decimal, now: Timestamp) {
        let mut state = self.state.lock();
        state.marks.insert(pair.clone(), price);

        if let Some(position) = state.account.position_mut(&pair.base) {
            position.mark(price, now);
        }

        let resting: Vec<ClientOrderId> = state
            .store
            .active_orders()
            .filter(|order| {
                order.pair == *pair
                    && order.kind == OrderKind::Limit
                    && is_marketable(order.side, order.price, price)
            })
            .map(|order| order.client_order_id.clone())
            .collect();

        for client_order_id in resting {
            let fill_price = state
                .store
                .get_active(&client_order_id)
                .and_then(|o| o.price)
                .unwrap_or(price);
            Self::settle_fill(&mut state, &client_order_id, fill_price, now, &self.config);
        }
    }

    /// Snapshot of running trade statistics, for a caller (the backtest engine, the paper-trading
    /// report) that wants them without going through the async [`ExecutionClient::account_balances`].
    pub fn statistics(&self) -> TradeStatistics {
        self.state.lock().stats
    }

    fn next_exchange_order_id(&self) -> ExchangeOrderId {
        let id = self.next_exchange_id.fetch_add(1, AtomicOrdering::Relaxed);
        ExchangeOrderId(format!("sim-{id}"))
    }

    fn settle_fill(
        state: &mut SimulatedState,
        client_order_id: &ClientOrderId,
        fill_price: Decimal,
        now: Timestamp,
        config: &SimulatedExecutorConfig,
    ) {
        let Some(order) = state.store.get_active(client_order_id) else {
            return;
        };
        let coin = order.pair.base.clone();
        let side = order.side;
        let qty = order.remaining_quantity();
        let commission = qty * fill_price * config.commission_rate;

        if let Err(error) = state.store.apply_fill(client_order_id, qty, fill_price, now) {
            warn!(?error, "simulated fill rejected by order store");
            return;
        }
        state.stats.record_commission(commission);
        state.account.free_collateral = state.account.free_collateral - commission;

        let realized_before = state
            .account
            .position(&coin)
            .map(|p| p.realized_pnl)
            .unwrap_or(Decimal::ZERO);

        if state.account.position(&coin).is_none() {
            state
                .account
                .upsert_position(Position::flat(coin.clone(), Leverage::cross(config.leverage), now));
        }
        let position = state.account.position_mut(&coin).expect("position just inserted");
        if position.apply_fill(side, qty, fill_price, now).is_err() {
            warn!("simulated fill exceeded position size, ignoring");
            return;
        }

        let realized_after = position.realized_pnl;
        if realized_after != realized_before {
            state
                .stats
                .record_realized_pnl(realized_after - realized_before);
        }

        let equity = state.account.margin_summary().account_value;
        state.stats.update_equity(equity);
        debug!(%client_order_id, %fill_price, %qty, "simulated order filled");
    }
}

fn is_marketable(side: Side, limit_price: Option<Decimal>, mark: Decimal) -> bool {
    let Some(limit_price) = limit_price else {
        return true;
    };
    match side {
        Side::Buy => mark.partial_cmp(&limit_price) != Some(std::cmp::Ordering::Greater),
        Side::Sell => mark.partial_cmp(&limit_price) != Some(std::cmp::Ordering::Less),
    }
}

#[async_trait]
impl ExecutionClient for SimulatedExecutor {
    async fn open_order(&self, request: OrderRequest) -> Result<OrderResult, ExecutionClientError> {
        let mut state = self.state.lock();
        let client_order_id = request.client_order_id.clone();
        let pair = request.pair.clone();
        let kind = request.kind;
        let order = Order::new(request);

        if state.store.insert_new(order.clone()).is_err() {
            return Ok(OrderResult::Rejected {
                client_order_id,
                reason: "duplicate client order id".into(),
            });
        }

        let mark = state.marks.get(&pair).copied();
        let Some(mark) = mark else {
            let _ = state.store.reject(&client_order_id, order.submitted_at);
            return Ok(OrderResult::Rejected {
                client_order_id,
                reason: "no mark price known for pair".into(),
            });
        };

        let exchange_order_id = self.next_exchange_order_id();
        state
            .store
            .acknowledge(&client_order_id, exchange_order_id, order.submitted_at)
            .map_err(|e| ExecutionClientError::Rejected(e.to_string()))?;

        let slipped = apply_slippage(order.side, mark, self.config.slippage_bps);
        if kind == OrderKind::Market || is_marketable(order.side, order.price, slipped) {
            let fill_price = if kind == OrderKind::Market {
                slipped
            } else {
                order.price.unwrap_or(slipped)
            };
            Self::settle_fill(&mut state, &client_order_id, fill_price, order.submitted_at, &self.config);
        }

        let final_order = state
            .store
            .get_active(&client_order_id)
            .cloned()
            .or_else(|| state.store.history().find(|o| o.client_order_id == client_order_id).cloned())
            .unwrap_or(order);
        Ok(OrderResult::Accepted(final_order))
    }

    async fn cancel_order(&self, request: CancelRequest) -> Result<(), ExecutionClientError> {
        let mut state = self.state.lock();
        state
            .store
            .cancel(&request.client_order_id, request.requested_at)
            .map_err(|e| ExecutionClientError::UnknownOrder(e_to_id(e, &request.client_order_id)))
    }

    async fn cancel_all_orders(&self, now: Timestamp) -> Result<Vec<ClientOrderId>, ExecutionClientError> {
        let mut state = self.state.lock();
        Ok(state.store.cancel_all(now))
    }

    async fn account_balances(&self) -> Result<Vec<AssetBalance>, ExecutionClientError> {
        let state = self.state.lock();
        Ok(vec![AssetBalance::new(
            "USD".to_string(),
            crate::balance::Balance::new(state.account.margin_summary().account_value, state.account.free_collateral),
            Timestamp::now(),
        )])
    }

    async fn get_order_status(
        &self,
        client_order_id: &ClientOrderId,
    ) -> Result<Option<OrderStatus>, ExecutionClientError> {
        let state = self.state.lock();
        let status = state
            .store
            .get_active(client_order_id)
            .or_else(|| state.store.history().find(|o| o.client_order_id == *client_order_id))
            .map(|order| order.status);
        Ok(status)
    }
}

fn apply_slippage(side: Side, mark: Decimal, slippage_bps: Decimal) -> Decimal {
    let bps_unit = Decimal::from_i64(10_000);
    let adjustment = mark * slippage_bps.checked_div(bps_unit).unwrap_or(Decimal::ZERO);
    match side {
        Side::Buy => mark + adjustment,
        Side::Sell => mark - adjustment,
    }
}

fn e_to_id(_: crate::order::store::OrderStoreError, id: &ClientOrderId) -> ClientOrderId {
    id.clone()
}
