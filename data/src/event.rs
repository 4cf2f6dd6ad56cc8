//! The normalized market event every [`crate::provider::DataProvider`] produces.

use serde::{Deserialize, Serialize};
use tradecore_decimal::{Decimal, Timestamp};
use tradecore_markets::{Pair, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarketEventKind {
    Quote { bid: Decimal, ask: Decimal },
    Trade { price: Decimal, quantity: Decimal, side: Side },
    Candle {
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    },
}

/// A single normalized tick from a venue, timestamped both at the source (`time_exchange`) and
/// on arrival (`time_received`) so downstream consumers can measure feed latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub pair: Pair,
    pub time_exchange: Timestamp,
    pub time_received: Timestamp,
    pub kind: MarketEventKind,
}

impl MarketEvent {
    pub fn last_price(&self) -> Option<Decimal> {
        match &self.kind {
            MarketEventKind::Quote { bid, ask } => Some((*bid + *ask).checked_div(Decimal::from_i64(2)).ok()?),
            MarketEventKind::Trade { price, .. } => Some(*price),
            MarketEventKind::Candle { close, .. } => Some(*close),
        }
    }
}
