//! Profit factor: gross profit divided by gross loss, a measure of how much is won per unit lost.

use serde::{Deserialize, Serialize};
use tradecore_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitFactor(pub Decimal);

impl ProfitFactor {
    /// `None` if there were no trades at all (profit and loss both zero). `Decimal::MAX` if
    /// there were wins but no losses, matching the "infinitely good" convention used elsewhere
    /// in this module for a divide-by-zero that favours the strategy.
    pub fn calculate(gross_profit: Decimal, gross_loss: Decimal) -> Option<Self> {
        let gross_loss = gross_loss.abs();
        if gross_profit.is_zero() && gross_loss.is_zero() {
            return None;
        }
        if gross_loss.is_zero() {
            return Some(Self(Decimal::MAX));
        }
        Some(Self(gross_profit.checked_div(gross_loss).unwrap_or(Decimal::NAN)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_trades_is_none() {
        assert_eq!(ProfitFactor::calculate(Decimal::ZERO, Decimal::ZERO), None);
    }

    #[test]
    fn no_losses_is_decimal_max() {
        let pf = ProfitFactor::calculate(Decimal::from_f64(100.0), Decimal::ZERO).unwrap();
        assert_eq!(pf.0, Decimal::MAX);
    }

    #[test]
    fn mixed_wins_and_losses() {
        let pf = ProfitFactor::calculate(Decimal::from_f64(300.0), Decimal::from_f64(-100.0)).unwrap();
        assert_eq!(pf.0, Decimal::from_f64(3.0));
    }
}
