//! OpenTelemetry trace pipeline.
//!
//! # Responsibilities
//! - Build the pipeline: resource → sampler → batch processor → OTLP/HTTP exporter
//! - Register it as the global tracer provider and W3C propagator
//! - Wrap the HTTP router so every request opens a server span
//! - Hand out the `tracing` layer that bridges spans into the pipeline
//!
//! # Design Decisions
//! - The collector endpoint is used verbatim (full URL with `/v1/traces`)
//! - Always-on sampling unless a ratio below 1.0 is configured
//! - Every fallible step runs before the router is touched

use std::time::Duration;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, Request, Response, StatusCode},
    Router,
};
use opentelemetry::{
    global,
    propagation::Extractor,
    trace::TracerProvider as _,
    KeyValue,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    error::OTelSdkResult,
    propagation::TraceContextPropagator,
    trace::{BatchSpanProcessor, Sampler, SdkTracer, SdkTracerProvider, SpanExporter},
    Resource,
};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{field, Span};
use tracing_opentelemetry::{OpenTelemetryLayer, OpenTelemetrySpanExt};
use tracing_subscriber::registry::LookupSpan;

use crate::config::ObservabilityConfig;
use crate::observability::collector_url;

/// Instrumentation scope name for spans produced by this crate.
const TRACER_NAME: &str = "storefront";

/// Errors raised while building the trace pipeline.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("invalid OTLP endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("failed to build OTLP exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),
}

/// A constructed trace pipeline.
///
/// Cloning is cheap; all clones share the same provider and batch queue.
#[derive(Debug, Clone)]
pub struct TracingPipeline {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
}

impl TracingPipeline {
    /// Assemble a pipeline around an arbitrary exporter.
    ///
    /// Production code goes through [`init_tracing`]; tests pass an
    /// in-memory exporter here.
    pub fn new<E>(config: &ObservabilityConfig, exporter: E) -> Self
    where
        E: SpanExporter + 'static,
    {
        let resource = Resource::builder()
            .with_service_name(config.service_name.clone())
            .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
            .build();

        let provider = SdkTracerProvider::builder()
            .with_resource(resource)
            .with_sampler(sampler(config.sample_ratio))
            .with_span_processor(BatchSpanProcessor::builder(exporter).build())
            .build();

        let tracer = provider.tracer(TRACER_NAME);
        Self { provider, tracer }
    }

    /// `tracing` layer exporting spans through this pipeline.
    pub fn layer<S>(&self) -> OpenTelemetryLayer<S, SdkTracer>
    where
        S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    {
        tracing_opentelemetry::layer().with_tracer(self.tracer.clone())
    }

    /// Wrap `app` so each request runs inside a server span named after its route.
    pub fn instrument_http<S>(&self, app: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        app.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_http_span)
                .on_response(record_response),
        )
    }

    /// Export everything queued so far. Blocks until the exporter returns.
    pub fn force_flush(&self) -> OTelSdkResult {
        self.provider.force_flush()
    }

    /// Flush and stop the batch processor.
    pub fn shutdown(&self) -> OTelSdkResult {
        self.provider.shutdown()
    }
}

/// Build the OTLP/HTTP pipeline, register it globally and instrument `app`.
///
/// Errors are returned untouched; isolating them is the bootstrap's job.
pub fn init_tracing<S>(
    app: &mut Router<S>,
    config: &ObservabilityConfig,
) -> Result<TracingPipeline, TracingError>
where
    S: Clone + Send + Sync + 'static,
{
    collector_url(&config.otlp_endpoint).map_err(|reason| TracingError::Endpoint {
        endpoint: config.otlp_endpoint.clone(),
        reason,
    })?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let pipeline = TracingPipeline::new(config, exporter);

    global::set_tracer_provider(pipeline.provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());

    *app = pipeline.instrument_http(std::mem::take(app));
    Ok(pipeline)
}

fn sampler(ratio: f64) -> Sampler {
    if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else {
        Sampler::TraceIdRatioBased(ratio)
    }
}

fn make_http_span(request: &Request<Body>) -> Span {
    let route = request.extensions().get::<MatchedPath>().map(MatchedPath::as_str);
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let span = tracing::info_span!(
        "http_request",
        otel.name = %span_name(request.method().as_str(), route),
        otel.kind = "server",
        otel.status_code = field::Empty,
        http.request.method = %request.method(),
        http.route = field::Empty,
        url.path = %request.uri().path(),
        http.response.status_code = field::Empty,
        request_id = %request_id,
    );
    if let Some(route) = route {
        span.record("http.route", route);
    }

    let remote = global::get_text_map_propagator(|propagator| {
        propagator.extract(&HeaderExtractor(request.headers()))
    });
    let _ = span.set_parent(remote);
    span
}

/// Server span name: method plus route template. Requests that matched no
/// route share one name so raw paths never reach the span name.
fn span_name(method: &str, route: Option<&str>) -> String {
    match route {
        Some(route) => format!("{} {}", method, route),
        None => format!("{} unmatched", method),
    }
}

fn record_response(response: &Response<Body>, latency: Duration, span: &Span) {
    let status = response.status();
    span.record("http.response.status_code", status.as_u16());
    if is_failure(status) {
        span.record("otel.status_code", "ERROR");
    }
    tracing::debug!(status = %status, latency_ms = latency.as_millis() as u64, "request finished");
}

/// 5xx, plus 408 from the request timeout.
fn is_failure(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT
}

/// Reads W3C trace context out of request headers.
struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
