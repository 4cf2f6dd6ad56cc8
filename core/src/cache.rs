//! Last-known-state store for market data, positions, and balances, keyed by symbol/coin.
//!
//! Reads never block and never fail: a key that was never written reads as absent. Writes are
//! idempotent-by-latest — no history is retained here; that's the order store's and the equity
//! curve's job. The cache can self-populate from the data engine's bus (see
//! [`Self::subscribe_to`]) or be written to directly when no bus is wired up.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;
use tradecore_decimal::Decimal;
use tradecore_execution::Balance;
use tradecore_integration::bus::SubscriberError;
use tradecore_integration::Bus;
use tradecore_integration::collection::FnvIndexMap;
use tradecore_markets::{Pair, Position};
use tradecore_data::MarketEvent;
use tradecore_trader::MarketDataView;

use crate::logging::CACHE_UPDATE_SPAN_NAME;

#[derive(Debug, Default)]
pub struct MarketCache {
    last_price: FnvIndexMap<Pair, Decimal>,
    last_quote: FnvIndexMap<Pair, (Decimal, Decimal)>,
    positions: FnvIndexMap<String, Position>,
    balances: FnvIndexMap<String, Balance>,
}

impl MarketCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_from_market_event(&mut self, event: &MarketEvent) {
        if let Some(price) = event.last_price() {
            self.last_price.insert(event.pair.clone(), price);
        }
        if let tradecore_data::MarketEventKind::Quote { bid, ask } = &event.kind {
            self.last_quote.insert(event.pair.clone(), (*bid, *ask));
        }
    }

    pub fn last_price(&self, pair: &Pair) -> Option<Decimal> {
        self.last_price.get(pair).copied()
    }

    pub fn last_quote(&self, pair: &Pair) -> Option<(Decimal, Decimal)> {
        self.last_quote.get(pair).copied()
    }

    pub fn set_position(&mut self, coin: impl Into<String>, position: Position) {
        self.positions.insert(coin.into(), position);
    }

    pub fn remove_position(&mut self, coin: &str) {
        self.positions.shift_remove(coin);
    }

    pub fn position(&self, coin: &str) -> Option<&Position> {
        self.positions.get(coin)
    }

    pub fn set_balance(&mut self, asset: impl Into<String>, balance: Balance) {
        self.balances.insert(asset.into(), balance);
    }

    pub fn balance(&self, asset: &str) -> Option<&Balance> {
        self.balances.get(asset)
    }

    /// Wires `cache` into `bus` as a subscriber of the market-event topic, so every published
    /// tick updates the last-known price/quote without the caller having to forward it by hand.
    /// Logged under [`CACHE_UPDATE_SPAN_NAME`] so [`crate::logging`] can filter the per-tick noise.
    pub fn subscribe_to(cache: Arc<Mutex<MarketCache>>, bus: &mut Bus<MarketEvent>, topic: &str) {
        bus.subscribe(topic.to_string(), move |event: &MarketEvent| {
            let _span = tracing::debug_span!(CACHE_UPDATE_SPAN_NAME).entered();
            debug!(pair = %event.pair, "cache updating from market event");
            cache
                .try_lock()
                .ok_or_else(|| SubscriberError::new("cache lock contended"))?
                .update_from_market_event(event);
            Ok(())
        });
    }
}

impl MarketDataView for MarketCache {
    fn last_price(&self, pair: &Pair) -> Option<Decimal> {
        MarketCache::last_price(self, pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradecore_data::MarketEventKind;
    use tradecore_decimal::Timestamp;

    fn tick(pair: Pair, price: f64) -> MarketEvent {
        MarketEvent {
            pair,
            time_exchange: Timestamp::ZERO,
            time_received: Timestamp::ZERO,
            kind: MarketEventKind::Trade {
                price: Decimal::from_f64(price),
                quantity: Decimal::from_f64(1.0),
                side: tradecore_markets::Side::Buy,
            },
        }
    }

    #[test]
    fn read_of_never_written_key_is_absent() {
        let cache = MarketCache::new();
        assert_eq!(cache.last_price(&Pair::new("BTC".into(), "USD".into())), None);
    }

    #[test]
    fn read_after_write_returns_last_value() {
        let mut cache = MarketCache::new();
        let pair = Pair::new("BTC".into(), "USD".into());
        cache.update_from_market_event(&tick(pair.clone(), 100.0));
        cache.update_from_market_event(&tick(pair.clone(), 105.0));
        assert_eq!(cache.last_price(&pair), Some(Decimal::from_f64(105.0)));
    }

    #[test]
    fn subscribe_to_bus_self_populates() {
        let cache = Arc::new(Mutex::new(MarketCache::new()));
        let mut bus: Bus<MarketEvent> = Bus::new();
        MarketCache::subscribe_to(Arc::clone(&cache), &mut bus, "market.event");

        let pair = Pair::new("ETH".into(), "USD".into());
        bus.publish("market.event", &tick(pair.clone(), 2000.0));

        assert_eq!(cache.lock().last_price(&pair), Some(Decimal::from_f64(2000.0)));
    }
}
