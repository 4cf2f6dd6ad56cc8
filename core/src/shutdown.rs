//! Graceful shutdown traits for engine components, synchronous and asynchronous variants.

use serde::{Deserialize, Serialize};
use std::future::Future;

pub trait SyncShutdown {
    type Result;
    fn shutdown(&mut self) -> Self::Result;
}

pub trait AsyncShutdown {
    type Result;
    fn shutdown(&mut self) -> impl Future<Output = Self::Result>;
}

/// A shutdown signal, carried as an [`crate::event::Event::Shutdown`] payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
pub struct Shutdown;
