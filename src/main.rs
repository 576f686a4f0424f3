//! Storefront binary.
//!
//! ```text
//!   Client ──▶ request id ──▶ timeout ──▶ HTTP span ──▶ handler ──▶ repository ──▶ SQL span ──▶ DB
//!                                             │             │            │              │
//!                                             └─────────────┴────────────┴──────────────┘
//!                                                     batch processor ──▶ OTLP/HTTP collector
//!
//!   pprof sampler ──▶ Pyroscope agent ──▶ Pyroscope server
//! ```

use std::path::PathBuf;

use clap::Parser;

use storefront::config::{load_config, validation::validate_config, ConfigError};
use storefront::lifecycle;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "E-commerce demo with OpenTelemetry tracing and Pyroscope profiling", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 127.0.0.1:8080).
    #[arg(short, long)]
    bind: Option<String>,

    /// Create tables and seed demo products on startup.
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if cli.migrate {
        config.database.migrate = true;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    lifecycle::run(config).await?;
    Ok(())
}
