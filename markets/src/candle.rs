//! OHLCV bar, the unit the backtest engine and data splitter both operate on.

use serde::{Deserialize, Serialize};
use tradecore_decimal::{Decimal, Timestamp};

use crate::pair::Pair;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub pair: Pair,
    pub open_time: Timestamp,
    pub close_time: Timestamp,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// True if `open`/`high`/`low`/`close` are mutually consistent (`low <= open,close <= high`).
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
            && self.low <= self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(low: f64, high: f64, open: f64, close: f64) -> Candle {
        Candle {
            pair: Pair::new("BTC".to_string(), "USD".to_string()),
            open_time: Timestamp::ZERO,
            close_time: Timestamp::from_millis(60_000),
            open: Decimal::from_f64(open),
            high: Decimal::from_f64(high),
            low: Decimal::from_f64(low),
            close: Decimal::from_f64(close),
            volume: Decimal::from_f64(1.0),
        }
    }

    #[test]
    fn consistent_candle_passes() {
        assert!(candle(90.0, 110.0, 100.0, 105.0).is_consistent());
    }

    #[test]
    fn close_above_high_is_inconsistent() {
        assert!(!candle(90.0, 100.0, 95.0, 105.0).is_consistent());
    }
}
