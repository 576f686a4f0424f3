//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! init() (once, before the listener is bound)
//!     → otel.rs       (trace pipeline + HTTP span layer)
//!     → logging.rs    (global subscriber, OTel bridge if tracing is up)
//!     → profiling.rs  (Pyroscope agent)
//!     → Observability (owns pipeline + profiler, InitReport)
//!
//! Per request:
//!     HTTP span (otel.rs) → handler span → repository span → SQL span (sql.rs)
//!     → batch processor → OTLP/HTTP collector
//! ```
//!
//! # Design Decisions
//! - Best effort: no tracing or profiling failure ever stops the service
//! - Each initializer reports an `InitStatus` instead of unwinding
//! - Pipeline and profiler are owned by `Observability`, flushed on shutdown

pub mod logging;
pub mod otel;
pub mod profiling;
pub mod sql;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use axum::Router;
use url::Url;

use crate::config::ObservabilityConfig;

pub use otel::{init_tracing, TracingError, TracingPipeline};
pub use profiling::{init_profiling, ProfilerSession, ProfilingError};
pub use sql::SqlTracing;

/// Outcome of one observability initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitStatus {
    Ready,
    /// Turned off in configuration.
    Disabled,
    /// Initialization failed; the service runs without this subsystem.
    Failed(String),
}

impl InitStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, InitStatus::Ready)
    }
}

impl fmt::Display for InitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitStatus::Ready => f.write_str("ready"),
            InitStatus::Disabled => f.write_str("disabled"),
            InitStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Aggregated bootstrap outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub tracing: InitStatus,
    pub subscriber: InitStatus,
    pub profiling: InitStatus,
}

impl InitReport {
    /// True when something that was asked for did not come up.
    pub fn is_degraded(&self) -> bool {
        [&self.tracing, &self.subscriber, &self.profiling]
            .iter()
            .any(|s| matches!(s, InitStatus::Failed(_)))
    }
}

/// Handle to the process's telemetry: trace pipeline and profiler session.
#[derive(Debug)]
pub struct Observability {
    tracing: Option<TracingPipeline>,
    profiler: Option<ProfilerSession>,
    report: InitReport,
}

impl Observability {
    /// A handle with nothing running.
    pub fn disabled() -> Self {
        Self {
            tracing: None,
            profiler: None,
            report: InitReport {
                tracing: InitStatus::Disabled,
                subscriber: InitStatus::Disabled,
                profiling: InitStatus::Disabled,
            },
        }
    }

    pub fn report(&self) -> &InitReport {
        &self.report
    }

    pub fn tracing(&self) -> Option<&TracingPipeline> {
        self.tracing.as_ref()
    }

    pub fn profiler(&self) -> Option<&ProfilerSession> {
        self.profiler.as_ref()
    }

    /// SQL instrumentation for the database behind `dsn`; disabled unless
    /// the trace pipeline came up.
    pub fn sql_tracing(&self, dsn: &str) -> SqlTracing {
        if self.tracing.is_some() {
            SqlTracing::for_dsn(dsn)
        } else {
            SqlTracing::Disabled
        }
    }

    /// Export queued spans now. Failures are logged.
    pub fn force_flush(&self) {
        if let Some(pipeline) = &self.tracing {
            if let Err(e) = pipeline.force_flush() {
                tracing::warn!(error = %e, "Trace flush failed");
            }
        }
    }

    /// Flush the trace pipeline and stop the profiler. Failures are logged.
    pub fn shutdown(self) {
        if let Some(pipeline) = self.tracing {
            match pipeline.shutdown() {
                Ok(()) => tracing::info!("Trace pipeline flushed"),
                Err(e) => tracing::warn!(error = %e, "Trace pipeline shutdown failed"),
            }
        }

        if let Some(profiler) = self.profiler {
            match profiler.stop() {
                Ok(()) => tracing::info!("Profiler stopped"),
                Err(e) => tracing::warn!(error = %e, "Profiler shutdown failed"),
            }
        }
    }
}

/// Wire tracing, logging and profiling into `app`. Call once per process.
///
/// Never fails: each subsystem that cannot start is logged and left out, and
/// the returned router serves traffic either way.
pub fn init<S>(mut app: Router<S>, config: &ObservabilityConfig) -> (Router<S>, Observability)
where
    S: Clone + Send + Sync + 'static,
{
    let (pipeline, tracing_status) = if config.tracing_enabled {
        match isolate(|| init_tracing(&mut app, config).map_err(|e| e.to_string())) {
            Ok(pipeline) => (Some(pipeline), InitStatus::Ready),
            Err(reason) => (None, InitStatus::Failed(reason)),
        }
    } else {
        (None, InitStatus::Disabled)
    };

    let subscriber_status = match logging::init_subscriber(config, pipeline.as_ref()) {
        Ok(()) => InitStatus::Ready,
        Err(e) => InitStatus::Failed(e.to_string()),
    };

    tracing::info!(service = %config.service_name, "Initializing observability");

    match &tracing_status {
        InitStatus::Ready => tracing::info!(
            endpoint = %config.otlp_endpoint,
            sample_ratio = config.sample_ratio,
            "Tracing initialized (HTTP and SQL instrumentation enabled)"
        ),
        InitStatus::Disabled => tracing::info!("Tracing disabled by configuration"),
        InitStatus::Failed(reason) => tracing::error!(
            error = %reason,
            "Tracing initialization failed (non-fatal), continuing without traces"
        ),
    }

    if let InitStatus::Failed(reason) = &subscriber_status {
        tracing::warn!(error = %reason, "Global subscriber already installed, keeping it");
    }

    let (profiler, profiling_status) = if config.profiling_enabled {
        match isolate(|| init_profiling(config).map_err(|e| e.to_string())) {
            Ok(session) => {
                tracing::info!(
                    server = %session.server(),
                    application = %session.application(),
                    "Profiling initialized (CPU)"
                );
                (Some(session), InitStatus::Ready)
            }
            Err(reason) => {
                tracing::error!(
                    error = %reason,
                    "Profiling initialization failed (non-fatal), continuing without profiles"
                );
                (None, InitStatus::Failed(reason))
            }
        }
    } else {
        tracing::info!("Profiling disabled by configuration");
        (None, InitStatus::Disabled)
    };

    let report = InitReport {
        tracing: tracing_status,
        subscriber: subscriber_status,
        profiling: profiling_status,
    };

    tracing::info!(
        tracing = %report.tracing,
        profiling = %report.profiling,
        degraded = report.is_degraded(),
        "Observability setup completed"
    );

    let observability = Observability {
        tracing: pipeline,
        profiler,
        report,
    };
    (app, observability)
}

/// Run an initializer, turning a panic into an ordinary failure.
fn isolate<T>(init: impl FnOnce() -> Result<T, String>) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(init)) {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("panicked: {}", reason))
        }
    }
}

/// Parse a collector address: absolute http(s) URL with a host.
pub(crate) fn collector_url(endpoint: &str) -> Result<Url, String> {
    let url = Url::parse(endpoint).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_url() {
        assert!(collector_url("http://alloy:4318/v1/traces").is_ok());
        assert!(collector_url("https://pyroscope.example.com").is_ok());
        assert!(collector_url("").is_err());
        assert!(collector_url("alloy:4318").is_err());
        assert!(collector_url("ftp://alloy").is_err());
    }

    #[test]
    fn test_isolate_converts_panic() {
        let result: Result<(), String> = isolate(|| panic!("exporter exploded"));
        assert_eq!(result.unwrap_err(), "panicked: exporter exploded");
    }

    #[test]
    fn test_report_degraded() {
        let mut report = Observability::disabled().report().clone();
        assert!(!report.is_degraded());
        report.profiling = InitStatus::Failed("unreachable".into());
        assert!(report.is_degraded());
    }

    #[test]
    fn test_disabled_handle_has_no_sql_tracing() {
        let obs = Observability::disabled();
        assert_eq!(obs.sql_tracing("sqlite::memory:"), SqlTracing::Disabled);
        obs.shutdown();
    }
}
