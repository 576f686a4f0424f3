//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Declare the storefront routes and their request timeout
//! - Wire up the outer middleware (request ID)
//! - Bind state, serve, and stop on the shutdown broadcast

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::http::handlers;
use crate::repository::Database;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Storefront routes, still waiting for their state.
///
/// Kept state-less so the observability bootstrap can wrap them before the
/// database exists.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home))
        .route("/checkout", post(handlers::checkout))
        .route("/success", get(handlers::success))
        .route("/healthz", get(handlers::healthz))
}

/// [`routes`] with a per-request deadline. Expired requests are cancelled and
/// answered with 408.
///
/// The deadline sits inside the HTTP span layer added by the observability
/// bootstrap, so a timed-out request still closes its span with a status.
#[allow(deprecated)]
pub fn timed_routes(timeout: Duration) -> Router<AppState> {
    routes().layer(TimeoutLayer::new(timeout))
}

/// HTTP server for the storefront.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Bind `state` into `app` and add the outer middleware stack.
    pub fn new(app: Router<AppState>, state: AppState) -> Self {
        let router = Self::build_router(app, state);
        Self { router }
    }

    fn build_router(app: Router<AppState>, state: AppState) -> Router {
        app.with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until a shutdown signal is broadcast, then drain
    /// in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
