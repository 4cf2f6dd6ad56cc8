//! Aggregates one or more [`DataProvider`]s, normalizes their output, and republishes it on a
//! dedicated [`Bus`] so downstream consumers (the backtest engine, the live trading engine)
//! subscribe the same way regardless of how many providers are feeding it.

use crate::event::MarketEvent;
use crate::provider::DataProvider;
use tracing::{debug, warn};
use tradecore_integration::bus::{Bus, Subscriber};

/// The single topic this engine's bus carries. Providers are already distinguished upstream (one
/// `DataEngine` per logical feed set); there is no need for per-pair or per-kind topics here.
const TOPIC_MARKET_EVENT: &str = "market.event";

/// Owns its own `Bus<MarketEvent>` rather than the engine-wide event bus used by `core`, so this
/// crate never needs to depend on `core`'s aggregate `Event` type. `core::live::LiveTradingEngine`
/// subscribes to this bus and re-publishes translated events onto its own.
pub struct DataEngine {
    providers: Vec<Box<dyn DataProvider>>,
    bus: Bus<MarketEvent>,
}

impl std::fmt::Debug for DataEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataEngine")
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl Default for DataEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DataEngine {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            bus: Bus::new(),
        }
    }

    pub fn add_provider(&mut self, provider: Box<dyn DataProvider>) {
        self.providers.push(provider);
    }

    pub fn subscribe(&mut self, subscriber: Subscriber<MarketEvent>) {
        self.bus.subscribe(TOPIC_MARKET_EVENT, subscriber);
    }

    /// Polls every provider once, publishing whatever events are ready. Returns the number of
    /// providers that are now exhausted (returned `None`).
    pub async fn poll_once(&mut self) -> usize {
        let mut exhausted = 0;
        for provider in &mut self.providers {
            match provider.next_event().await {
                Some(event) => {
                    debug!(pair = %event.pair, "data engine publishing market event");
                    self.bus.publish(TOPIC_MARKET_EVENT, &event);
                }
                None => exhausted += 1,
            }
        }
        exhausted
    }

    /// Drains every provider to exhaustion, publishing each event as it arrives. Intended for
    /// backtests driven by [`crate::provider::ReplayProvider`]s, where every provider eventually
    /// terminates.
    pub async fn run_to_completion(&mut self) {
        if self.providers.is_empty() {
            warn!("data engine has no providers to run");
            return;
        }
        loop {
            let exhausted = self.poll_once().await;
            if exhausted == self.providers.len() {
                break;
            }
        }
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ReplayProvider;
    use std::sync::{Arc, Mutex};
    use tradecore_decimal::{Decimal, Timestamp};
    use tradecore_markets::Pair;

    fn event(price: i64) -> MarketEvent {
        MarketEvent {
            pair: Pair::parse("BTC/USDT").unwrap(),
            time_exchange: Timestamp::from_millis(0),
            time_received: Timestamp::from_millis(0),
            kind: crate::event::MarketEventKind::Trade {
                price: Decimal::from_i64(price),
                quantity: Decimal::ONE,
                side: tradecore_markets::Side::Buy,
            },
        }
    }

    #[tokio::test]
    async fn run_to_completion_publishes_every_event_from_every_provider() {
        let mut engine = DataEngine::new();
        engine.add_provider(Box::new(ReplayProvider::new(vec![event(100), event(101)])));
        engine.add_provider(Box::new(ReplayProvider::new(vec![event(200)])));

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        engine.subscribe(Box::new(move |event: &MarketEvent| {
            received_clone.lock().unwrap().push(event.last_price());
            Ok(())
        }));

        engine.run_to_completion().await;
        assert_eq!(received.lock().unwrap().len(), 3);
    }
}
