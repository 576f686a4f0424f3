//! HTTP surface of the storefront.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request id, timeout, HTTP span from observability)
//!     → handlers.rs (home, checkout, success, healthz)
//!     → repository (named spans + SQL spans)
//!     → views.rs (HTML) / error.rs (JSON errors)
//! ```

pub mod error;
pub mod handlers;
pub mod server;
pub mod views;

pub use error::AppError;
pub use server::{routes, timed_routes, AppState, HttpServer};
