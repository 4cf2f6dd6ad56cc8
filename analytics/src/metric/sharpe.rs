//! Sharpe ratio: risk-adjusted return, comparing excess return (above the risk-free rate) to
//! the standard deviation of returns.
//!
//! Reference: <https://www.investopedia.com/articles/07/sharpe_ratio.asp>

use crate::time::TimeInterval;
use serde::{Deserialize, Serialize};
use tradecore_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SharpeRatio<Interval> {
    pub value: Decimal,
    pub interval: Interval,
}

impl<Interval> SharpeRatio<Interval>
where
    Interval: TimeInterval,
{
    /// `Decimal::MAX` when `std_dev_returns` is zero, matching the convention that a riskless
    /// excess return is "infinitely" good rather than undefined.
    pub fn calculate(
        risk_free_return: Decimal,
        mean_return: Decimal,
        std_dev_returns: Decimal,
        returns_period: Interval,
    ) -> Self {
        if std_dev_returns.is_zero() {
            return Self {
                value: Decimal::MAX,
                interval: returns_period,
            };
        }
        let excess_returns = mean_return - risk_free_return;
        let value = excess_returns.checked_div(std_dev_returns).unwrap_or(Decimal::NAN);
        Self {
            value,
            interval: returns_period,
        }
    }

    /// Rescales the ratio to `target`'s sampling frequency, assuming IID returns (the standard
    /// square-root-of-time scaling).
    pub fn scale<TargetInterval>(self, target: TargetInterval) -> SharpeRatio<TargetInterval>
    where
        TargetInterval: TimeInterval,
    {
        let target_secs = Decimal::from_i64(target.interval().num_seconds());
        let current_secs = Decimal::from_i64(self.interval.interval().num_seconds());

        let scale = target_secs
            .abs()
            .checked_div(current_secs.abs())
            .unwrap_or(Decimal::MAX)
            .sqrt();
        // `checked_div` above only fails when `current_secs` is zero, which never happens for a
        // real `TimeInterval`; fall back to `MAX` rather than propagate the error type here.

        SharpeRatio {
            value: self.value * scale,
            interval: target,
        }
    }
}
