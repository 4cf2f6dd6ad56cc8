//! Calmar ratio: annualised return divided by maximum drawdown, a measure of return earned per
//! unit of worst-case pain endured.

use serde::{Deserialize, Serialize};
use tradecore_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalmarRatio(pub Decimal);

impl CalmarRatio {
    /// `Decimal::MAX` if `max_drawdown_pct` is zero, matching the zero-denominator convention
    /// used by [`crate::metric::sharpe::SharpeRatio`] and [`crate::metric::sortino::SortinoRatio`].
    pub fn calculate(annualised_return_pct: Decimal, max_drawdown_pct: Decimal) -> Self {
        if max_drawdown_pct.is_zero() {
            return Self(Decimal::MAX);
        }
        let value = annualised_return_pct
            .checked_div(max_drawdown_pct.abs())
            .unwrap_or(Decimal::NAN);
        Self(value)
    }
}
