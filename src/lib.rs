//! E-commerce storefront instrumented with OpenTelemetry tracing and
//! Pyroscope profiling.
//!
//! Business code never talks to the telemetry SDKs. `observability::init`
//! wraps the router once at startup, the database handle wraps every query,
//! and handlers only name their spans.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod repository;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::Observability;
