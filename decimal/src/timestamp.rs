//! Millisecond-resolution wall-clock timestamp shared by every component on the hot path.

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, Sub},
    time::{SystemTime, UNIX_EPOCH},
};

/// A 64-bit millisecond wall-clock timestamp.
///
/// Distinct from `chrono::DateTime<Utc>` on purpose: every hot-path struct (`Order`, `Event`,
/// candle bars) carries a plain `i64` count of milliseconds since the Unix epoch so that
/// comparisons and arithmetic never allocate and never touch a calendar.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    /// The current wall-clock time.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_millis() as i64;
        Timestamp(millis)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    pub const fn millis(&self) -> i64 {
        self.0
    }

    /// Nanosecond count, for interop with components that expect nanosecond granularity.
    /// `nanos = millis * 10^6`.
    pub const fn nanos(&self) -> i64 {
        self.0 * 1_000_000
    }

    pub fn checked_add_millis(&self, millis: i64) -> Option<Timestamp> {
        self.0.checked_add(millis).map(Timestamp)
    }

    pub fn duration_since(&self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl Add<i64> for Timestamp {
    type Output = Timestamp;
    fn add(self, rhs: i64) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}

impl Sub<i64> for Timestamp {
    type Output = Timestamp;
    fn sub(self, rhs: i64) -> Timestamp {
        Timestamp(self.0 - rhs)
    }
}

impl Sub for Timestamp {
    type Output = i64;
    fn sub(self, rhs: Timestamp) -> i64 {
        self.0 - rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanos_is_millis_times_1e6() {
        let ts = Timestamp::from_millis(5);
        assert_eq!(ts.nanos(), 5_000_000);
    }

    #[test]
    fn duration_since_is_signed_difference() {
        let a = Timestamp::from_millis(100);
        let b = Timestamp::from_millis(40);
        assert_eq!(a.duration_since(b), 60);
        assert_eq!(b.duration_since(a), -60);
    }
}
