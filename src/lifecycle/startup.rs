//! Startup orchestration.
//!
//! # Responsibilities
//! - Bring up observability before anything else (never fatal)
//! - Connect the database (fatal on failure)
//! - Bind the listener last, so traffic only arrives when ready
//! - On shutdown: drain, close the pool, flush telemetry

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::http::{self, AppState, HttpServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{self, Observability};
use crate::repository::Database;

/// Errors that stop the process from coming up (or from exiting cleanly).
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database initialization failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A started storefront: listener bound, requests being served.
pub struct Service {
    addr: SocketAddr,
    shutdown: Shutdown,
    signal: broadcast::Receiver<()>,
    server: JoinHandle<Result<(), std::io::Error>>,
    db: Database,
    observability: Observability,
    grace: Duration,
}

impl Service {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handle that stops the service when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn observability(&self) -> &Observability {
        &self.observability
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Wait for the shutdown trigger, drain within the grace period, then
    /// release the pool and flush telemetry.
    pub async fn wait(self) -> Result<(), StartupError> {
        let Service {
            mut signal,
            mut server,
            db,
            observability,
            grace,
            ..
        } = self;

        let outcome = tokio::select! {
            res = &mut server => res,
            _ = signal.recv() => match tokio::time::timeout(grace, &mut server).await {
                Ok(res) => res,
                Err(_) => {
                    tracing::warn!(grace_secs = grace.as_secs(), "Drain deadline passed, aborting in-flight requests");
                    server.abort();
                    Ok(Ok(()))
                }
            },
        };

        db.close().await;
        observability.shutdown();
        tracing::info!("Shutdown complete");

        outcome?.map_err(StartupError::Serve)
    }
}

/// Start every subsystem and begin serving.
pub async fn start(config: AppConfig) -> Result<Service, StartupError> {
    let routes = http::timed_routes(Duration::from_secs(config.timeouts.request_secs));
    let (app, observability) = observability::init(routes, &config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let sql_tracing = observability.sql_tracing(&config.database.dsn);
    let db = match connect_database(&config, sql_tracing).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Database init failed");
            observability.shutdown();
            return Err(e.into());
        }
    };

    let listener = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(source) => {
            db.close().await;
            observability.shutdown();
            return Err(StartupError::Bind {
                address: config.listener.bind_address.clone(),
                source,
            });
        }
    };
    let addr = listener.local_addr().map_err(StartupError::Serve)?;
    tracing::info!(address = %addr, "Listening for connections");

    let server = HttpServer::new(app, AppState { db: db.clone() });
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let server = tokio::spawn(server.run(listener, shutdown.subscribe()));

    Ok(Service {
        addr,
        shutdown,
        signal,
        server,
        db,
        observability,
        grace: Duration::from_secs(config.timeouts.shutdown_grace_secs),
    })
}

/// Start the storefront and run until SIGINT/SIGTERM.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let service = start(config).await?;
    signals::spawn_signal_listener(service.shutdown_handle());
    service.wait().await
}

async fn connect_database(
    config: &AppConfig,
    sql_tracing: observability::SqlTracing,
) -> Result<Database, sqlx::Error> {
    let db = Database::connect(&config.database, sql_tracing).await?;
    if config.database.migrate {
        db.migrate().await?;
        db.seed_demo_products().await?;
    }
    Ok(db)
}
