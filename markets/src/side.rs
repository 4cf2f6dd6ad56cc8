//! Order / position side.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tradecore_decimal::Decimal;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Sign multiplier: `+1` for `Buy`, `-1` for `Sell`. Used throughout PnL arithmetic so a
    /// single formula covers both long and short (see `Position::unrealized_pnl`).
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => -Decimal::ONE,
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}
