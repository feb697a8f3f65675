//! CLI module for LiftLog
//!
//! Parses command line arguments, initializes logging, opens the record
//! store, and runs the HTTP server until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::http_server::{HttpServer, HttpServerConfig};
use crate::store::ExerciseStore;

/// LiftLog - a self-hostable exercise log service
#[derive(Parser, Debug)]
#[command(name = "liftlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Host to bind to
    #[arg(long, env = "LIFTLOG_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Data directory holding the exercise journal
    #[arg(long, env = "LIFTLOG_DATA_DIR", default_value = "./liftlog-data")]
    pub data_dir: PathBuf,

    /// CORS allowed origin (repeatable; any origin when unset)
    #[arg(long = "cors-origin", env = "LIFTLOG_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Parse arguments, open the store, and serve until shutdown.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(ExerciseStore::open(&cli.data_dir)?);
    let record_count = store.count()?;
    tracing::info!(
        data_dir = %cli.data_dir.display(),
        records = record_count,
        "opened exercise store"
    );

    let config = HttpServerConfig {
        host: cli.host,
        port: cli.port,
        cors_origins: cli.cors_origins,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(HttpServer::with_config(config, store).start())?;

    Ok(())
}
