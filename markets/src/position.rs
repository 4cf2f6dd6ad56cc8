//! Signed position accounting: weighted entry price, realized/unrealized PnL, and leverage.

use crate::side::Side;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradecore_decimal::{Decimal, Timestamp};

/// Errors raised while mutating a [`Position`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionError {
    /// A decrease quantity exceeded the position's current absolute size.
    #[error("decrease quantity {requested} exceeds position size {available}")]
    InvalidQuantity {
        requested: Decimal,
        available: Decimal,
    },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeverageType {
    Cross,
    Isolated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leverage {
    pub kind: LeverageType,
    pub value: Decimal,
    pub raw_usd: Decimal,
}

impl Leverage {
    pub fn cross(value: Decimal) -> Self {
        Self {
            kind: LeverageType::Cross,
            value,
            raw_usd: Decimal::ZERO,
        }
    }

    pub fn isolated(value: Decimal, raw_usd: Decimal) -> Self {
        Self {
            kind: LeverageType::Isolated,
            value,
            raw_usd,
        }
    }
}

/// Cumulative funding paid/received, tracked over three horizons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CumFunding {
    pub all_time: Decimal,
    pub since_change: Decimal,
    pub since_open: Decimal,
}

/// A signed position: positive `szi` is long, negative is short, zero is flat.
///
/// See invariants P1-P5 in the module's owning spec: side is derived from the sign of `szi`
/// (P1), weighted entry accumulates on same-direction fills (P2), opposite-direction fills
/// realize PnL and shrink the position (P3), unrealized PnL uses signed multiplication so long
/// and short are asymmetric around a mark move (P4), and an over-sized decrease is rejected
/// rather than clamped (P5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coin: String,
    pub szi: Decimal,
    pub entry_px: Decimal,
    pub mark_price: Option<Decimal>,
    pub liquidation_px: Option<Decimal>,
    pub leverage: Leverage,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub margin_used: Decimal,
    pub position_value: Decimal,
    pub return_on_equity: Decimal,
    pub cum_funding: CumFunding,
    pub opened_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Position {
    /// Opens a flat position record for `coin` at `now`, ready for its first fill.
    pub fn flat(coin: impl Into<String>, leverage: Leverage, now: Timestamp) -> Self {
        Self {
            coin: coin.into(),
            szi: Decimal::ZERO,
            entry_px: Decimal::ZERO,
            mark_price: None,
            liquidation_px: None,
            leverage,
            unrealized_pnl: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            margin_used: Decimal::ZERO,
            position_value: Decimal::ZERO,
            return_on_equity: Decimal::ZERO,
            cum_funding: CumFunding::default(),
            opened_at: now,
            updated_at: now,
        }
    }

    /// Side derived from the sign of `szi` (P1). `None` when flat.
    pub fn side(&self) -> Option<Side> {
        if self.szi.is_sign_positive() && !self.szi.is_zero() {
            Some(Side::Buy)
        } else if self.szi.is_sign_negative() {
            Some(Side::Sell)
        } else {
            None
        }
    }

    pub fn is_flat(&self) -> bool {
        self.szi.is_zero()
    }

    /// Applies a fill of `qty` (always positive) at `price` on the given `side`.
    ///
    /// Same-direction fills (or opening from flat) increase the position and recompute the
    /// quantity-weighted entry price (P2). Opposite-direction fills realize PnL on the reduced
    /// quantity (P3) and fail with [`PositionError::InvalidQuantity`] if `qty` exceeds the
    /// current absolute size (P5) rather than clamping it.
    pub fn apply_fill(
        &mut self,
        side: Side,
        qty: Decimal,
        price: Decimal,
        now: Timestamp,
    ) -> Result<(), PositionError> {
        let fill_signed_direction = side.sign();
        let is_same_direction = self.is_flat()
            || (self.szi.is_sign_positive() && fill_signed_direction == Decimal::ONE)
            || (self.szi.is_sign_negative() && fill_signed_direction == -Decimal::ONE);

        if is_same_direction {
            let abs_szi = self.szi.abs();
            let new_abs = abs_szi + qty;
            // P2: new_entry = (|szi|*entry + q*price) / (|szi|+q)
            self.entry_px = ((abs_szi * self.entry_px) + (qty * price))
                .checked_div(new_abs)
                .unwrap_or(price);
            self.szi = self.szi + qty * fill_signed_direction;
            if self.opened_at.millis() == 0 && self.is_flat() {
                self.opened_at = now;
            }
        } else {
            let available = self.szi.abs();
            if qty.partial_cmp(&available) == Some(std::cmp::Ordering::Greater) {
                return Err(PositionError::InvalidQuantity {
                    requested: qty,
                    available,
                });
            }
            // P3: realized PnL = (close_price - entry) * qty * sign(szi)
            let realized = (price - self.entry_px) * qty * self.szi.signum();
            self.realized_pnl = self.realized_pnl + realized;
            let new_abs = available - qty;
            self.szi = new_abs * self.szi.signum();
            if new_abs.is_zero() {
                self.entry_px = Decimal::ZERO;
                self.unrealized_pnl = Decimal::ZERO;
                self.position_value = Decimal::ZERO;
            }
        }
        self.updated_at = now;
        Ok(())
    }

    /// Marks the position to `mark`, updating unrealized PnL (P4), position value, and
    /// leverage-derived margin usage.
    pub fn mark(&mut self, mark: Decimal, now: Timestamp) {
        self.mark_price = Some(mark);
        if !self.is_flat() {
            // P4: unrealized_pnl(mark) = (mark - entry) * szi
            self.unrealized_pnl = (mark - self.entry_px) * self.szi;
            self.position_value = self.szi.abs() * mark;
            if !self.leverage.value.is_zero() {
                self.margin_used = self
                    .position_value
                    .checked_div(self.leverage.value)
                    .unwrap_or(Decimal::NAN);
                if !self.margin_used.is_zero() {
                    self.return_on_equity = self
                        .unrealized_pnl
                        .checked_div(self.margin_used)
                        .unwrap_or(Decimal::NAN);
                }
            }
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn open_long_then_add_then_close_matches_spec_scenario() {
        let mut position = Position::flat("BTC", Leverage::cross(Decimal::from_i64(1)), ts(0));

        position
            .apply_fill(Side::Buy, Decimal::from_i64(1), Decimal::from_i64(2000), ts(1))
            .unwrap();
        assert_eq!(position.entry_px, Decimal::from_i64(2000));

        position
            .apply_fill(Side::Buy, Decimal::from_i64(1), Decimal::from_i64(2100), ts(2))
            .unwrap();
        assert_eq!(position.entry_px, Decimal::from_i64(2050));
        assert_eq!(position.szi, Decimal::from_i64(2));

        position
            .apply_fill(Side::Sell, Decimal::from_i64(1), Decimal::from_i64(2050), ts(3))
            .unwrap();
        assert_eq!(position.realized_pnl, Decimal::ZERO);
        assert_eq!(position.szi, Decimal::from_i64(1));
        assert_eq!(position.entry_px, Decimal::from_i64(2050));
    }

    #[test]
    fn unrealized_pnl_on_long_position() {
        let mut position = Position::flat("ETH", Leverage::cross(Decimal::from_i64(1)), ts(0));
        position
            .apply_fill(Side::Buy, Decimal::from_i64(1), Decimal::from_i64(2000), ts(1))
            .unwrap();
        position.mark(Decimal::from_i64(2100), ts(2));
        assert_eq!(position.unrealized_pnl, Decimal::from_i64(100));
    }

    #[test]
    fn unrealized_pnl_on_short_position_is_asymmetric() {
        let mut position = Position::flat("ETH", Leverage::cross(Decimal::from_i64(1)), ts(0));
        position
            .apply_fill(Side::Sell, Decimal::from_i64(1), Decimal::from_i64(2000), ts(1))
            .unwrap();
        position.mark(Decimal::from_i64(2100), ts(2));
        // short: price went up, so unrealized pnl is negative
        assert_eq!(position.unrealized_pnl, Decimal::from_i64(-100));
    }

    #[test]
    fn decrease_exceeding_size_is_rejected() {
        let mut position = Position::flat("BTC", Leverage::cross(Decimal::from_i64(1)), ts(0));
        position
            .apply_fill(Side::Buy, Decimal::from_i64(1), Decimal::from_i64(2000), ts(1))
            .unwrap();

        let err = position
            .apply_fill(Side::Sell, Decimal::from_i64(2), Decimal::from_i64(2000), ts(2))
            .unwrap_err();
        assert_eq!(
            err,
            PositionError::InvalidQuantity {
                requested: Decimal::from_i64(2),
                available: Decimal::from_i64(1),
            }
        );
    }

    #[test]
    fn full_close_resets_entry_and_value() {
        let mut position = Position::flat("BTC", Leverage::cross(Decimal::from_i64(1)), ts(0));
        position
            .apply_fill(Side::Buy, Decimal::from_i64(1), Decimal::from_i64(2000), ts(1))
            .unwrap();
        position
            .apply_fill(Side::Sell, Decimal::from_i64(1), Decimal::from_i64(2100), ts(2))
            .unwrap();

        assert!(position.is_flat());
        assert_eq!(position.entry_px, Decimal::ZERO);
        assert_eq!(position.realized_pnl, Decimal::from_i64(100));
        assert_eq!(position.side(), None);
    }
}
