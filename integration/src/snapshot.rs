//! A last-known value paired with the time it was observed.

use serde::{Deserialize, Serialize};
use tradecore_decimal::Timestamp;

/// Wraps a value with the [`Timestamp`] it was last written, the shape every entry in a
/// last-known-state cache takes (a ticker, an order book level, a position, a balance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub value: T,
    pub time: Timestamp,
}

impl<T> Snapshot<T> {
    pub fn new(value: T, time: Timestamp) -> Self {
        Self { value, time }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Snapshot<U> {
        Snapshot {
            value: f(self.value),
            time: self.time,
        }
    }
}
