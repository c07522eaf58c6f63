use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

/// Page cache counters emitted by `cache::store`.
const PAGE_CACHE_COUNTERS: [(&str, &str); 4] = [
    (
        "yatube_page_cache_hit_total",
        "Global feed requests answered from the page cache.",
    ),
    (
        "yatube_page_cache_miss_total",
        "Global feed requests that had to be rendered.",
    ),
    (
        "yatube_page_cache_expired_total",
        "Cached pages dropped because their TTL elapsed.",
    ),
    (
        "yatube_page_cache_evict_total",
        "Cached pages evicted due to capacity.",
    ),
];

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the global tracing subscriber for `logging`.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    METRIC_DESCRIPTIONS.call_once(|| {
        for (name, description) in PAGE_CACHE_COUNTERS {
            describe_counter!(name, Unit::Count, description);
        }
    });

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(output_layer(logging.format))
        .try_init()
        .map_err(|err| InfraError::telemetry(format!("failed to install tracing subscriber: {err}")))
}

fn output_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    }
}
