//! Environment variable lookup.
//!
//! Every deployment knob of the service is an optional environment variable
//! with a literal fallback. Lookups never fail.

/// Service identity shared by tracing and profiling.
pub const OTEL_SERVICE_NAME: &str = "OTEL_SERVICE_NAME";
/// Collector URL for trace export (full URL, including `/v1/traces`).
pub const OTEL_EXPORTER_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
/// Collector URL for profile export.
pub const PYROSCOPE_ENDPOINT: &str = "PYROSCOPE_ENDPOINT";
/// Connection string for the persistence layer.
pub const DATABASE_DSN: &str = "DATABASE_DSN";

/// Read `key` from the process environment, falling back to `default`.
///
/// Only an absent variable yields the default. A variable explicitly set to
/// the empty string is returned as-is. Values that are not valid UTF-8 are
/// treated as absent.
pub fn get(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable name so they can run in parallel.

    #[test]
    fn test_absent_returns_default() {
        std::env::remove_var("STOREFRONT_TEST_ENV_ABSENT");
        assert_eq!(get("STOREFRONT_TEST_ENV_ABSENT", "fallback"), "fallback");
    }

    #[test]
    fn test_empty_is_not_replaced_by_default() {
        std::env::set_var("STOREFRONT_TEST_ENV_EMPTY", "");
        assert_eq!(get("STOREFRONT_TEST_ENV_EMPTY", "fallback"), "");
        std::env::remove_var("STOREFRONT_TEST_ENV_EMPTY");
    }

    #[test]
    fn test_set_value_wins() {
        std::env::set_var("STOREFRONT_TEST_ENV_SET", "shop-api");
        assert_eq!(get("STOREFRONT_TEST_ENV_SET", "fallback"), "shop-api");
        std::env::remove_var("STOREFRONT_TEST_ENV_SET");
    }
}
