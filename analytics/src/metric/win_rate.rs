//! Win rate: the fraction of closed trades that were profitable.

use serde::{Deserialize, Serialize};
use tradecore_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinRate(pub Decimal);

impl WinRate {
    /// `None` if no trades were closed; win rate is undefined, not zero, with an empty sample.
    pub fn calculate(winning_trades: u64, total_trades: u64) -> Option<Self> {
        if total_trades == 0 {
            return None;
        }
        let value = Decimal::from_i64(winning_trades as i64)
            .checked_div(Decimal::from_i64(total_trades as i64))
            .unwrap_or(Decimal::NAN);
        Some(Self(value))
    }
}
