//! Standardized `tracing` setup. Filters a named high-frequency span (the cache's
//! self-populating bus subscription) so normal operation doesn't spam the log.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Span name the cache's bus subscription callback runs inside; see [`crate::cache::MarketCache`].
pub const CACHE_UPDATE_SPAN_NAME: &str = "cache_bus_update";

pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(CacheUpdateSpanFilter)
        .init()
}

pub fn init_json_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
        .with(CacheUpdateSpanFilter)
        .init()
}

struct CacheUpdateSpanFilter;

impl<S> tracing_subscriber::layer::Layer<S> for CacheUpdateSpanFilter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn event_enabled(
        &self,
        _: &tracing::Event<'_>,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) -> bool {
        if let Some(span) = ctx.lookup_current() {
            span.name() != CACHE_UPDATE_SPAN_NAME
        } else {
            true
        }
    }
}
