//! Structured logging.
//!
//! Builds the process-wide `tracing` subscriber: a fmt layer (pretty or JSON)
//! behind an `EnvFilter`, plus the OpenTelemetry bridge when a trace pipeline
//! is available. `RUST_LOG` overrides the configured level.
//!
//! The level filter applies to log output only. The bridge has its own
//! INFO floor, so `log_level = "warn"` still exports every span.

use tracing::Subscriber;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter, Layer,
};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::observability::otel::TracingPipeline;

/// Assemble the subscriber without installing it.
pub fn subscriber(
    config: &ObservabilityConfig,
    pipeline: Option<&TracingPipeline>,
) -> impl Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = match config.log_format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(filter)
            .boxed(),
    };

    let otel_layer = pipeline.map(|p| p.layer().with_filter(LevelFilter::INFO));

    tracing_subscriber::registry().with(fmt_layer).with(otel_layer)
}

/// Install the global subscriber.
///
/// Fails if a global subscriber already exists (e.g. a second call in tests).
pub fn init_subscriber(
    config: &ObservabilityConfig,
    pipeline: Option<&TracingPipeline>,
) -> Result<(), TryInitError> {
    subscriber(config, pipeline).try_init()
}
