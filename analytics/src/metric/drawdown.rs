//! Drawdown: peak-to-trough decline of an equity curve, and the summary statistics derived from
//! a full run of drawdowns.

use serde::{Deserialize, Serialize};
use tradecore_decimal::{Decimal, Timestamp};

/// A single peak-to-trough-to-recovery episode. `recovered_at` is `None` while the drawdown is
/// still open (the curve has not yet made a new high since the trough).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawdown {
    pub peak_equity: Decimal,
    pub peak_at: Timestamp,
    pub trough_equity: Decimal,
    pub trough_at: Timestamp,
    pub recovered_at: Option<Timestamp>,
}

impl Drawdown {
    /// Magnitude as a fraction of peak equity (0.1 == 10% drawdown). `Decimal::ZERO` if
    /// `peak_equity` is zero, since there's no meaningful percentage to express.
    pub fn percentage(&self) -> Decimal {
        if self.peak_equity.is_zero() {
            return Decimal::ZERO;
        }
        let decline = self.peak_equity - self.trough_equity;
        decline.checked_div(self.peak_equity).unwrap_or(Decimal::NAN)
    }
}

/// Streams an equity curve and emits completed (recovered) and, at the end, any still-open
/// [`Drawdown`]. Stateful by design: feed it points in chronological order via [`Self::update`].
#[derive(Debug, Clone)]
pub struct DrawdownGenerator {
    peak_equity: Decimal,
    peak_at: Timestamp,
    current: Option<Drawdown>,
    completed: Vec<Drawdown>,
}

impl DrawdownGenerator {
    pub fn new(initial_equity: Decimal, initial_at: Timestamp) -> Self {
        Self {
            peak_equity: initial_equity,
            peak_at: initial_at,
            current: None,
            completed: Vec::new(),
        }
    }

    /// Feeds the next equity point. Starts, extends, or recovers a drawdown as appropriate.
    pub fn update(&mut self, equity: Decimal, at: Timestamp) {
        if equity >= self.peak_equity {
            self.peak_equity = equity;
            self.peak_at = at;
            if let Some(drawdown) = self.current.take() {
                self.completed.push(Drawdown {
                    recovered_at: Some(at),
                    ..drawdown
                });
            }
            return;
        }

        match &mut self.current {
            Some(drawdown) if equity < drawdown.trough_equity => {
                drawdown.trough_equity = equity;
                drawdown.trough_at = at;
            }
            Some(_) => {}
            None => {
                self.current = Some(Drawdown {
                    peak_equity: self.peak_equity,
                    peak_at: self.peak_at,
                    trough_equity: equity,
                    trough_at: at,
                    recovered_at: None,
                });
            }
        }
    }

    /// All completed drawdowns plus the still-open one (if any), in chronological order.
    pub fn into_drawdowns(mut self) -> Vec<Drawdown> {
        if let Some(open) = self.current.take() {
            self.completed.push(open);
        }
        self.completed
    }

    /// Deepest drawdown percentage seen so far, including one still open. `Decimal::ZERO` if no
    /// drawdown has ever occurred.
    pub fn max_drawdown_pct(&self) -> Decimal {
        let mut max = Decimal::ZERO;
        for dd in self.completed.iter().chain(self.current.iter()) {
            let pct = dd.percentage();
            if pct > max {
                max = pct;
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(seconds: i64) -> Timestamp {
        Timestamp::from_millis(seconds * 1000)
    }

    #[test]
    fn no_drawdown_on_monotonic_rise() {
        let mut gen = DrawdownGenerator::new(Decimal::from_f64(100.0), ts(0));
        gen.update(Decimal::from_f64(110.0), ts(1));
        gen.update(Decimal::from_f64(120.0), ts(2));
        assert_eq!(gen.max_drawdown_pct(), Decimal::ZERO);
        assert!(gen.into_drawdowns().is_empty());
    }

    #[test]
    fn tracks_trough_and_recovery() {
        let mut gen = DrawdownGenerator::new(Decimal::from_f64(100.0), ts(0));
        gen.update(Decimal::from_f64(80.0), ts(1));
        gen.update(Decimal::from_f64(70.0), ts(2));
        gen.update(Decimal::from_f64(105.0), ts(3));

        let drawdowns = gen.into_drawdowns();
        assert_eq!(drawdowns.len(), 1);
        let dd = &drawdowns[0];
        assert_eq!(dd.trough_equity, Decimal::from_f64(70.0));
        assert_eq!(dd.recovered_at, Some(ts(3)));
        assert_eq!(dd.percentage(), Decimal::from_f64(0.3));
    }

    #[test]
    fn open_drawdown_has_no_recovery() {
        let mut gen = DrawdownGenerator::new(Decimal::from_f64(100.0), ts(0));
        gen.update(Decimal::from_f64(90.0), ts(1));
        assert_eq!(gen.max_drawdown_pct(), Decimal::from_f64(0.1));
        let drawdowns = gen.into_drawdowns();
        assert_eq!(drawdowns[0].recovered_at, None);
    }
}
