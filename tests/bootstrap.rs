//! Observability failures never keep the storefront from serving.

use reqwest::StatusCode;
use storefront::lifecycle::startup::{self, Service};
use storefront::lifecycle::StartupError;
use storefront::observability::{InitStatus, SqlTracing};
use storefront::AppConfig;

mod common;

/// Valid URL, nothing listening.
const DEAD_COLLECTOR: &str = "http://127.0.0.1:9/v1/traces";

async fn assert_serves(service: &Service) {
    let client = common::client();
    let health = client
        .get(common::url(service.local_addr(), "/healthz"))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await.unwrap(), "ok");

    let listing = client
        .get(common::url(service.local_addr(), "/"))
        .send()
        .await
        .unwrap();
    assert_eq!(listing.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unreachable_collector_is_not_an_init_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::service_config(&dir);
    config.observability.tracing_enabled = true;
    config.observability.otlp_endpoint = DEAD_COLLECTOR.into();

    let service = startup::start(config).await.unwrap();
    assert_eq!(service.observability().report().tracing, InitStatus::Ready);
    assert!(service.observability().tracing().is_some());
    assert!(service.database().tracing().is_enabled());
    assert_serves(&service).await;

    service.shutdown_handle().trigger();
    service.wait().await.unwrap();
}

#[tokio::test]
async fn test_malformed_trace_endpoint_degrades_to_untraced() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::service_config(&dir);
    config.observability.tracing_enabled = true;
    config.observability.otlp_endpoint = "not a url".into();

    let service = startup::start(config).await.unwrap();
    let report = service.observability().report();
    assert!(matches!(report.tracing, InitStatus::Failed(_)));
    assert!(report.is_degraded());
    assert!(service.observability().tracing().is_none());
    assert_eq!(service.database().tracing(), SqlTracing::Disabled);
    assert_serves(&service).await;

    service.shutdown_handle().trigger();
    service.wait().await.unwrap();
}

#[tokio::test]
async fn test_profiling_failure_leaves_tracing_up() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::service_config(&dir);
    config.observability.tracing_enabled = true;
    config.observability.otlp_endpoint = DEAD_COLLECTOR.into();
    config.observability.profiling_enabled = true;
    config.observability.pyroscope_endpoint = "pyroscope:4040".into();

    let service = startup::start(config).await.unwrap();
    let report = service.observability().report();
    assert_eq!(report.tracing, InitStatus::Ready);
    assert!(matches!(report.profiling, InitStatus::Failed(_)));
    assert!(service.observability().profiler().is_none());
    assert_serves(&service).await;

    service.shutdown_handle().trigger();
    service.wait().await.unwrap();
}

#[tokio::test]
async fn test_disabled_subsystems_report_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let service = startup::start(common::service_config(&dir)).await.unwrap();

    let report = service.observability().report();
    assert_eq!(report.tracing, InitStatus::Disabled);
    assert_eq!(report.profiling, InitStatus::Disabled);
    assert_serves(&service).await;

    service.shutdown_handle().trigger();
    service.wait().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_database_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.observability.tracing_enabled = false;
    config.observability.profiling_enabled = false;
    config.database.acquire_timeout_secs = 1;
    config.database.dsn = format!(
        "sqlite://{}",
        dir.path().join("missing").join("shop.db").display()
    );

    let err = startup::start(config).await.err().unwrap();
    assert!(matches!(err, StartupError::Database(_)));
}
