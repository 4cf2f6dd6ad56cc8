//! A trading pair (base asset quoted in terms of a quote asset).

use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};

/// A trading pair, e.g. `BTC/USDT`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Constructor, Display,
)]
#[display("{base}/{quote}")]
pub struct Pair {
    pub base: String,
    pub quote: String,
}

impl Pair {
    /// Parses `"BASE/QUOTE"` into a [`Pair`].
    pub fn parse(symbol: &str) -> Option<Self> {
        let (base, quote) = symbol.split_once('/')?;
        Some(Pair::new(base.to_string(), quote.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let pair = Pair::parse("BTC/USDT").unwrap();
        assert_eq!(pair.to_string(), "BTC/USDT");
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(Pair::parse("BTCUSDT").is_none());
    }
}
