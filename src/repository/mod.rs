//! Persistence layer.
//!
//! # Data Flow
//! ```text
//! handler
//!     → product.rs / order.rs (named spans: get_products, get_product,
//!                              create_order, get_order)
//!     → database.rs (pooled connection, SQL span per statement)
//!     → Postgres (production) / SQLite (local, tests)
//! ```
//!
//! # Design Decisions
//! - Money is stored as integer cents
//! - A missing row is `Ok(None)`, never an error
//! - Pool size bounds concurrent data access; acquisition waits are bounded

pub mod database;
pub mod order;
pub mod product;

use serde::Serialize;

pub use database::Database;

/// A product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
}

/// An order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub total_cents: i64,
}

/// Render cents as a decimal amount ("30.00").
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
