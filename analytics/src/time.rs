//! Time-interval conventions used to annualize or rescale a metric.

use chrono::TimeDelta;

/// A named period a return series is sampled over, used to rescale metrics like
/// [`crate::metric::sharpe::SharpeRatio`] between sampling frequencies.
pub trait TimeInterval: Clone + PartialEq + std::fmt::Debug {
    fn interval(&self) -> TimeDelta;
}

impl TimeInterval for TimeDelta {
    fn interval(&self) -> TimeDelta {
        *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Daily;

impl TimeInterval for Daily {
    fn interval(&self) -> TimeDelta {
        TimeDelta::days(1)
    }
}

/// A calendar year measured in trading days (252), the standard convention for equities and
/// most liquid crypto/FX markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annual252;

impl TimeInterval for Annual252 {
    fn interval(&self) -> TimeDelta {
        TimeDelta::days(252)
    }
}

/// A calendar year measured in calendar days (365), used when a market trades every day
/// (most crypto venues).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annual365;

impl TimeInterval for Annual365 {
    fn interval(&self) -> TimeDelta {
        TimeDelta::days(365)
    }
}
