//! Sortino ratio: like [`crate::metric::sharpe::SharpeRatio`], but penalises only downside
//! volatility (returns below a target) instead of volatility in either direction.

use crate::time::TimeInterval;
use serde::{Deserialize, Serialize};
use tradecore_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SortinoRatio<Interval> {
    pub value: Decimal,
    pub interval: Interval,
}

impl<Interval> SortinoRatio<Interval>
where
    Interval: TimeInterval,
{
    /// `Decimal::MAX` when `downside_deviation` is zero (no observed downside), mirroring
    /// [`crate::metric::sharpe::SharpeRatio::calculate`]'s zero-std-dev convention.
    pub fn calculate(
        risk_free_return: Decimal,
        mean_return: Decimal,
        downside_deviation: Decimal,
        returns_period: Interval,
    ) -> Self {
        if downside_deviation.is_zero() {
            return Self {
                value: Decimal::MAX,
                interval: returns_period,
            };
        }
        let excess_returns = mean_return - risk_free_return;
        let value = excess_returns
            .checked_div(downside_deviation)
            .unwrap_or(Decimal::NAN);
        Self {
            value,
            interval: returns_period,
        }
    }
}
