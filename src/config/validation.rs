//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected, not just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check value ranges and addresses.
///
/// Observability endpoints are deliberately not checked here: a bad collector
/// URL must degrade telemetry, never block startup.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let ratio = config.observability.sample_ratio;
    if !(0.0..=1.0).contains(&ratio) {
        errors.push(ValidationError::new(
            "observability.sample_ratio",
            format!("{} is outside 0.0..=1.0", ratio),
        ));
    }

    if config.observability.profiling_sample_rate == 0 {
        errors.push(ValidationError::new(
            "observability.profiling_sample_rate",
            "must be greater than 0",
        ));
    }

    if config.database.dsn.is_empty() {
        errors.push(ValidationError::new("database.dsn", "must not be empty"));
    }

    if config.database.max_connections == 0 {
        errors.push(ValidationError::new("database.max_connections", "must be greater than 0"));
    }

    if config.database.acquire_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "database.acquire_timeout_secs",
            "must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
