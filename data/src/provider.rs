//! The [`DataProvider`] trait every market-data source (live feed or historical replay)
//! implements, and a simple in-memory replay provider used for backtesting and tests.

use crate::event::MarketEvent;
use async_trait::async_trait;
use std::collections::VecDeque;

/// A source of normalized [`MarketEvent`]s. A live implementation wraps an exchange WebSocket
/// feed; [`ReplayProvider`] wraps a pre-recorded, ordered sequence for backtests.
#[async_trait]
pub trait DataProvider: Send {
    /// Returns the next event, or `None` once the source is exhausted (a historical replay
    /// reaching its end, or a live feed that has been told to stop).
    async fn next_event(&mut self) -> Option<MarketEvent>;
}

/// Replays a fixed, caller-supplied sequence of events in order. The sequence is assumed to
/// already be sorted by `time_exchange`; [`crate::engine::DataEngine`] does not re-sort it.
#[derive(Debug, Default)]
pub struct ReplayProvider {
    events: VecDeque<MarketEvent>,
}

impl ReplayProvider {
    pub fn new(events: impl IntoIterator<Item = MarketEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl DataProvider for ReplayProvider {
    async fn next_event(&mut self) -> Option<MarketEvent> {
        self.events.pop_front()
    }
}
