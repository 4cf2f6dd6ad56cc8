#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity)]

//! # Decimal - Fixed-Precision Arithmetic
//!
//! A signed, fixed-precision decimal number with a distinguished `NaN`, used for every price,
//! quantity, PnL, and balance on the hot path of the Tradecore framework.
//!
//! Unlike `rust_decimal::Decimal`, this type carries an explicit `NaN` sentinel so that
//! "no such value" (an empty order book side, an unset mark price) can propagate through
//! arithmetic the way floating point `NaN` does, while keeping exact fixed-point semantics
//! everywhere else. `NaN` is never equal to anything, including itself; non-`NaN` values compare
//! with a normal total order. For sorting and other contexts that need a single well-defined
//! order over *all* values (including `NaN`), use [`Decimal::cmp_total`].
//!
//! ## Representation
//!
//! Internally a `Decimal` is `Option<i128>`: `None` is `NaN`, `Some(mantissa)` is
//! `mantissa / 10^SCALE`. `SCALE` is fixed at compile time ([`Decimal::SCALE`]), which keeps
//! arithmetic branch-free and avoids the allocation/rescaling costs of an arbitrary-precision
//! decimal.

pub mod timestamp;

pub use timestamp::Timestamp;

use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
    str::FromStr,
};
use thiserror::Error;

/// Errors produced by [`Decimal`] arithmetic and parsing.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DecimalError {
    /// Division where the divisor's mantissa is zero (including `0 / 0`).
    #[error("divide by zero")]
    DivideByZero,
    /// The mantissa over/underflowed `i128` during a multiply, add, or scale conversion.
    #[error("decimal overflow")]
    Overflow,
    /// Input could not be parsed as a decimal literal.
    #[error("invalid decimal literal: {0}")]
    Parse(String),
}

/// A signed fixed-precision decimal with a `NaN` sentinel.
///
/// See the module documentation for representation and equality/ordering semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Decimal(Option<i128>);

impl Decimal {
    /// Number of fractional decimal digits carried by every `Decimal`.
    pub const SCALE: u32 = 9;

    const SCALE_FACTOR: i128 = 1_000_000_000;

    /// The `NaN` sentinel. Never equal to anything, including itself.
    pub const NAN: Decimal = Decimal(None);
    pub const ZERO: Decimal = Decimal(Some(0));
    pub const ONE: Decimal = Decimal(Some(Self::SCALE_FACTOR));
    pub const MAX: Decimal = Decimal(Some(i128::MAX));
    pub const MIN: Decimal = Decimal(Some(i128::MIN));

    /// Constructs a `Decimal` from an integer mantissa already scaled by [`Decimal::SCALE`].
    pub const fn from_mantissa(mantissa: i128) -> Self {
        Decimal(Some(mantissa))
    }

    /// Constructs a `Decimal` representing the integer `value`.
    pub fn from_i64(value: i64) -> Self {
        Decimal(Some(i128::from(value) * Self::SCALE_FACTOR))
    }

    /// Constructs a `Decimal` from an `f64`, rounding to [`Decimal::SCALE`] digits.
    ///
    /// Returns [`Decimal::NAN`] if `value` is not finite.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Decimal::NAN;
        }
        let scaled = value * (Self::SCALE_FACTOR as f64);
        Decimal(Some(scaled.round() as i128))
    }

    /// True if `self` is the `NaN` sentinel.
    pub fn is_nan(&self) -> bool {
        self.0.is_none()
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.0, Some(0))
    }

    pub fn is_sign_positive(&self) -> bool {
        matches!(self.0, Some(m) if m >= 0)
    }

    pub fn is_sign_negative(&self) -> bool {
        matches!(self.0, Some(m) if m < 0)
    }

    /// Returns the sign of `self` as `-1`, `0`, or `1`, or `NaN` if `self` is `NaN`.
    pub fn signum(&self) -> Decimal {
        match self.0 {
            None => Decimal::NAN,
            Some(m) => Decimal::from_i64(m.signum() as i64),
        }
    }

    pub fn abs(&self) -> Decimal {
        match self.0 {
            None => Decimal::NAN,
            Some(m) => Decimal(m.checked_abs().map_or(None, Some)),
        }
    }

    pub fn checked_add(&self, rhs: Decimal) -> Option<Decimal> {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => a.checked_add(b).map(Decimal::from_mantissa),
            _ => Some(Decimal::NAN),
        }
    }

    pub fn checked_sub(&self, rhs: Decimal) -> Option<Decimal> {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => a.checked_sub(b).map(Decimal::from_mantissa),
            _ => Some(Decimal::NAN),
        }
    }

    pub fn checked_mul(&self, rhs: Decimal) -> Option<Decimal> {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => a
                .checked_mul(b)
                .map(|wide| wide / Self::SCALE_FACTOR)
                .map(Decimal::from_mantissa),
            _ => Some(Decimal::NAN),
        }
    }

    /// Divides `self` by `rhs`. `NaN` propagates; `0 / 0` and `x / 0` both fail with
    /// [`DecimalError::DivideByZero`] rather than propagating `NaN`, matching the spec's
    /// explicit divide-by-zero error contract.
    pub fn checked_div(&self, rhs: Decimal) -> Result<Decimal, DecimalError> {
        match (self.0, rhs.0) {
            (_, Some(0)) => Err(DecimalError::DivideByZero),
            (Some(a), Some(b)) => {
                let wide = a
                    .checked_mul(Self::SCALE_FACTOR)
                    .ok_or(DecimalError::Overflow)?;
                Ok(Decimal::from_mantissa(wide / b))
            }
            _ => Ok(Decimal::NAN),
        }
    }

    /// Approximate square root via Newton's method. `NaN` propagates; negative inputs yield
    /// `NaN`. Only used by technical-indicator code (out of scope here) but kept on the core
    /// type since indicator code assumes its presence.
    pub fn sqrt(&self) -> Decimal {
        match self.0 {
            None => Decimal::NAN,
            Some(m) if m < 0 => Decimal::NAN,
            Some(0) => Decimal::ZERO,
            Some(m) => {
                let value = (m as f64) / (Self::SCALE_FACTOR as f64);
                Decimal::from_f64(value.sqrt())
            }
        }
    }

    /// Total order over *all* values, including `NaN`, which sorts greater than every non-`NaN`
    /// value and equal to every other `NaN`. Use this for sorting/top-N selection; use
    /// `partial_cmp` (via `<`, `>`, …) for arithmetic comparisons, which correctly report `NaN`
    /// as unordered.
    pub fn cmp_total(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self.0 {
            None => f64::NAN,
            Some(m) => (m as f64) / (Self::SCALE_FACTOR as f64),
        }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Decimal::ZERO
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.0, other.0), (Some(a), Some(b)) if a == b)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    }
}

impl Add for Decimal {
    type Output = Decimal;
    fn add(self, rhs: Decimal) -> Decimal {
        self.checked_add(rhs).unwrap_or(Decimal::NAN)
    }
}

impl Sub for Decimal {
    type Output = Decimal;
    fn sub(self, rhs: Decimal) -> Decimal {
        self.checked_sub(rhs).unwrap_or(Decimal::NAN)
    }
}

impl Mul for Decimal {
    type Output = Decimal;
    fn mul(self, rhs: Decimal) -> Decimal {
        self.checked_mul(rhs).unwrap_or(Decimal::NAN)
    }
}

impl Div for Decimal {
    type Output = Decimal;
    /// Panics on divide-by-zero; use [`Decimal::checked_div`] on paths where a zero divisor is
    /// a reachable, recoverable condition (risk checks, PnL math against a possibly-empty book).
    fn div(self, rhs: Decimal) -> Decimal {
        self.checked_div(rhs).expect("divide by zero")
    }
}

impl Neg for Decimal {
    type Output = Decimal;
    fn neg(self) -> Decimal {
        match self.0 {
            None => Decimal::NAN,
            Some(m) => Decimal(m.checked_neg()),
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => write!(f, "NaN"),
            Some(m) => {
                let negative = m < 0;
                let m = m.unsigned_abs();
                let int_part = m / (Self::SCALE_FACTOR as u128);
                let frac_part = m % (Self::SCALE_FACTOR as u128);
                if negative {
                    write!(f, "-")?;
                }
                write!(
                    f,
                    "{int_part}.{:0width$}",
                    frac_part,
                    width = Self::SCALE as usize
                )
            }
        }
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("nan") {
            return Ok(Decimal::NAN);
        }
        let (sign, s) = match s.strip_prefix('-') {
            Some(rest) => (-1i128, rest),
            None => (1i128, s.strip_prefix('+').unwrap_or(s)),
        };
        let mut parts = s.splitn(2, '.');
        let int_part = parts.next().unwrap_or("0");
        let frac_part = parts.next().unwrap_or("");
        if frac_part.len() as u32 > Decimal::SCALE {
            return Err(DecimalError::Parse(s.to_string()));
        }
        let int_value: i128 = int_part
            .parse()
            .map_err(|_| DecimalError::Parse(s.to_string()))?;
        let mut frac_digits = frac_part.to_string();
        while (frac_digits.len() as u32) < Decimal::SCALE {
            frac_digits.push('0');
        }
        let frac_value: i128 = if frac_digits.is_empty() {
            0
        } else {
            frac_digits
                .parse()
                .map_err(|_| DecimalError::Parse(s.to_string()))?
        };
        let mantissa = sign * (int_value * Decimal::SCALE_FACTOR + frac_value);
        Ok(Decimal::from_mantissa(mantissa))
    }
}

impl From<Decimal> for String {
    fn from(value: Decimal) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Decimal {
    type Error = DecimalError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::from_i64(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_never_equal() {
        assert_ne!(Decimal::NAN, Decimal::NAN);
        assert_ne!(Decimal::NAN, Decimal::ZERO);
    }

    #[test]
    fn nan_propagates_through_arithmetic() {
        assert!((Decimal::NAN + Decimal::ONE).is_nan());
        assert!((Decimal::ONE * Decimal::NAN).is_nan());
        assert!((Decimal::NAN - Decimal::ONE).is_nan());
    }

    #[test]
    fn non_nan_total_order_respected() {
        let a = Decimal::from_i64(1);
        let b = Decimal::from_i64(2);
        assert!(a < b);
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Less));
    }

    #[test]
    fn nan_is_unordered_via_partial_cmp() {
        assert_eq!(Decimal::NAN.partial_cmp(&Decimal::ONE), None);
    }

    #[test]
    fn cmp_total_places_nan_consistently() {
        let mut values = vec![Decimal::from_i64(3), Decimal::NAN, Decimal::from_i64(1)];
        values.sort_by(Decimal::cmp_total);
        assert_eq!(values[0], Decimal::from_i64(1));
        assert_eq!(values[1], Decimal::from_i64(3));
        assert!(values[2].is_nan());
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        assert_eq!(
            Decimal::ONE.checked_div(Decimal::ZERO),
            Err(DecimalError::DivideByZero)
        );
    }

    #[test]
    fn parse_and_display_round_trip() {
        let value: Decimal = "123.456".parse().unwrap();
        assert_eq!(value.to_string(), "123.456000000");
    }

    #[test]
    fn parse_negative() {
        let value: Decimal = "-0.5".parse().unwrap();
        assert_eq!(value, Decimal::from_f64(-0.5));
    }

    #[test]
    fn weighted_entry_arithmetic_matches_spec_scenario() {
        // open long 1@2000, add 1@2100 -> entry 2050
        let sz = Decimal::from_i64(1);
        let entry = Decimal::from_i64(2000);
        let add_qty = Decimal::from_i64(1);
        let add_px = Decimal::from_i64(2100);
        let new_entry = ((sz * entry) + (add_qty * add_px))
            .checked_div(sz + add_qty)
            .unwrap();
        assert_eq!(new_entry, Decimal::from_i64(2050));
    }
}
