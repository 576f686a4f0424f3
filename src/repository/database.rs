//! Database connection management.
//!
//! Wraps a sqlx `AnyPool` so the same code talks to Postgres in the cluster
//! and to SQLite on a laptop. Every statement issued by the repositories goes
//! through [`Database::tracing`], which owns the SQL span hook.

use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::config::DatabaseConfig;
use crate::observability::sql::{db_system, SqlTracing};

/// Products inserted by [`Database::seed_demo_products`] into an empty catalogue.
const DEMO_PRODUCTS: &[(&str, i64)] = &[
    ("Mechanical Keyboard", 8999),
    ("Wireless Mouse", 2450),
    ("USB-C Hub", 3900),
    ("27\" Monitor", 24900),
];

/// Pooled database handle. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    tracing: SqlTracing,
    system: &'static str,
}

impl Database {
    /// Open the pool and check that the server answers.
    ///
    /// Any error here is a startup failure.
    pub async fn connect(
        config: &DatabaseConfig,
        sql_tracing: SqlTracing,
    ) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .test_before_acquire(true)
            .connect(&config.dsn)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        let system = db_system(&config.dsn);
        tracing::info!(
            system,
            max_connections = config.max_connections,
            sql_tracing = sql_tracing.is_enabled(),
            "Connected to database"
        );

        Ok(Self {
            pool,
            tracing: sql_tracing,
            system,
        })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn tracing(&self) -> SqlTracing {
        self.tracing
    }

    /// `db.system` of the connected server.
    pub fn system(&self) -> &'static str {
        self.system
    }

    /// Create the `products` and `orders` tables if they are missing.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        for statement in schema(self.system) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!(system = self.system, "Schema ready");
        Ok(())
    }

    /// Fill an empty catalogue with a few products. Returns how many were added.
    pub async fn seed_demo_products(&self) -> Result<u64, sqlx::Error> {
        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Ok(0);
        }

        let mut inserted = 0;
        for (name, price_cents) in DEMO_PRODUCTS {
            sqlx::query("INSERT INTO products (name, price_cents) VALUES ($1, $2)")
                .bind(*name)
                .bind(*price_cents)
                .execute(&self.pool)
                .await?;
            inserted += 1;
        }
        tracing::info!(count = inserted, "Seeded demo products");
        Ok(inserted)
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection closed");
    }
}

fn schema(system: &str) -> [&'static str; 2] {
    match system {
        "sqlite" => [
            "CREATE TABLE IF NOT EXISTS products (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL,
                price_cents INTEGER NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS orders (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id  INTEGER NOT NULL,
                quantity    INTEGER NOT NULL,
                total_cents INTEGER NOT NULL,
                created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        ],
        _ => [
            "CREATE TABLE IF NOT EXISTS products (
                id          BIGSERIAL PRIMARY KEY,
                name        VARCHAR(255) NOT NULL,
                price_cents BIGINT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS orders (
                id          BIGSERIAL PRIMARY KEY,
                product_id  BIGINT NOT NULL,
                quantity    BIGINT NOT NULL,
                total_cents BIGINT NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        ],
    }
}
