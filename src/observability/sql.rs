//! SQL execution instrumentation.
//!
//! The persistence layer routes every query future through [`SqlTracing::trace`].
//! When tracing is active each statement becomes a client span, child of
//! whatever span is current at the call site, named after the SQL operation.

use std::future::Future;

use tracing::Instrument;

/// Switch handed to the database layer by the observability bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlTracing {
    /// Queries run untouched.
    #[default]
    Disabled,
    /// Queries run inside a client span.
    Enabled {
        /// Value of the `db.system` attribute ("postgresql", "sqlite", ...).
        system: &'static str,
    },
}

impl SqlTracing {
    /// Build the enabled variant for the database behind `dsn`.
    pub fn for_dsn(dsn: &str) -> Self {
        SqlTracing::Enabled {
            system: db_system(dsn),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, SqlTracing::Enabled { .. })
    }

    /// Run `query` inside a span describing `statement`.
    pub async fn trace<F, T>(&self, statement: &str, query: F) -> T
    where
        F: Future<Output = T>,
    {
        match self {
            SqlTracing::Disabled => query.await,
            SqlTracing::Enabled { system } => {
                let operation = operation_name(statement);
                let span = tracing::info_span!(
                    "sql_query",
                    otel.name = %operation,
                    otel.kind = "client",
                    db.system = *system,
                    db.operation = %operation,
                    db.statement = %statement,
                );
                query.instrument(span).await
            }
        }
    }
}

/// First keyword of a statement, upper-cased ("SELECT", "INSERT", ...).
pub fn operation_name(statement: &str) -> String {
    statement
        .split_whitespace()
        .next()
        .map(|word| word.to_ascii_uppercase())
        .unwrap_or_else(|| "QUERY".to_string())
}

/// OpenTelemetry `db.system` value for a connection string.
pub fn db_system(dsn: &str) -> &'static str {
    let scheme = dsn.split(':').next().unwrap_or_default();
    match scheme {
        "postgres" | "postgresql" => "postgresql",
        "sqlite" => "sqlite",
        "mysql" | "mariadb" => "mysql",
        _ => "other_sql",
    }
}
