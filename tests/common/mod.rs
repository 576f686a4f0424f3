//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use opentelemetry_sdk::trace::{InMemorySpanExporter, InMemorySpanExporterBuilder, SpanData};
use storefront::config::{AppConfig, DatabaseConfig, ObservabilityConfig};
use storefront::http::{timed_routes, AppState, HttpServer};
use storefront::observability::{SqlTracing, TracingPipeline};
use storefront::repository::{product, Database, Product};
use tempfile::TempDir;

/// SQLite database config backed by a file in `dir`.
pub fn sqlite_config(dir: &TempDir) -> DatabaseConfig {
    sized_sqlite_config(dir, 4)
}

pub fn sized_sqlite_config(dir: &TempDir, max_connections: u32) -> DatabaseConfig {
    DatabaseConfig {
        dsn: format!("sqlite://{}?mode=rwc", dir.path().join("shop.db").display()),
        max_connections,
        acquire_timeout_secs: 5,
        migrate: true,
    }
}

/// Migrated database holding product 7 ("Widget", 10.00).
pub async fn seeded_db(sql_tracing: SqlTracing) -> (TempDir, Database) {
    seeded_db_sized(sql_tracing, 4).await
}

/// As [`seeded_db`], with a pool of `max_connections`.
pub async fn seeded_db_sized(sql_tracing: SqlTracing, max_connections: u32) -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let config = sized_sqlite_config(&dir, max_connections);
    let db = Database::connect(&config, sql_tracing).await.unwrap();
    db.migrate().await.unwrap();
    product::insert_product(&db, &widget()).await.unwrap();
    (dir, db)
}

pub fn widget() -> Product {
    Product {
        id: 7,
        name: "Widget".into(),
        price_cents: 1000,
    }
}

/// Pipeline exporting into memory, plus the exporter to read from.
pub fn recording_pipeline() -> (TracingPipeline, InMemorySpanExporter) {
    let exporter = InMemorySpanExporterBuilder::new().build();
    let pipeline = TracingPipeline::new(&ObservabilityConfig::default(), exporter.clone());
    (pipeline, exporter)
}

/// Fully layered router with HTTP spans from `pipeline`.
pub fn traced_app(pipeline: &TracingPipeline, db: Database) -> Router {
    let timeout = Duration::from_secs(AppConfig::default().timeouts.request_secs);
    traced_app_with_timeout(pipeline, db, timeout)
}

pub fn traced_app_with_timeout(pipeline: &TracingPipeline, db: Database, timeout: Duration) -> Router {
    let app = pipeline.instrument_http(timed_routes(timeout));
    HttpServer::new(app, AppState { db }).router()
}

/// Flush the pipeline and return every exported span.
pub fn finished_spans(pipeline: &TracingPipeline, exporter: &InMemorySpanExporter) -> Vec<SpanData> {
    pipeline.force_flush().unwrap();
    exporter.get_finished_spans().unwrap()
}

/// Exactly one span called `name`.
pub fn single<'a>(spans: &'a [SpanData], name: &str) -> &'a SpanData {
    let matching: Vec<_> = spans.iter().filter(|s| s.name == name).collect();
    assert_eq!(matching.len(), 1, "expected one '{}' span, got {}", name, matching.len());
    matching[0]
}

/// Config for a live service on an ephemeral port with telemetry off.
pub fn service_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.timeouts.shutdown_grace_secs = 2;
    config.observability.tracing_enabled = false;
    config.observability.profiling_enabled = false;
    config.database = sqlite_config(dir);
    config
}

/// HTTP client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}
