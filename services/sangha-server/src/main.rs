//! Sangha Portal finance server
//!
//! Serves the ledger reconciliation API over the community donation feed
//! and the meeting finance records.
//!
//! # Usage
//!
//! ```bash
//! # Start against the default SQLite database
//! sangha-server
//!
//! # Start with a custom config file
//! sangha-server --config /path/to/config.toml
//!
//! # Start in dev mode with a seeded in-memory store
//! sangha-server --dev-mode
//! ```

mod config;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use rust_decimal_macros::dec;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sangha_api::{create_router, ApiConfig, AppState};
use sangha_ledger::Reconciler;
use sangha_store::{MemoryStore, SqliteStore};
use sangha_types::{Donation, DonationId};

use crate::config::{LoggingConfig, ServerConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Sangha Portal finance server
#[derive(Parser, Debug)]
#[command(name = "sangha-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, env = "SANGHA_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "SANGHA_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SANGHA_PORT")]
    port: Option<u16>,

    /// SQLite connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SANGHA_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "SANGHA_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// Run with a seeded in-memory store instead of SQLite
    #[arg(long, env = "SANGHA_DEV_MODE")]
    dev_mode: bool,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    // Override with CLI arguments
    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(db_url) = args.database_url {
        server_config.database.sqlite_url = db_url;
    }
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Sangha Portal finance server"
    );

    let ledger = init_ledger(&server_config, args.dev_mode).await?;
    let state = Arc::new(AppState::new(ledger));

    let api_config = ApiConfig {
        enable_cors: server_config.api.enable_cors,
        enable_tracing: server_config.api.enable_tracing,
    };
    let app = create_router(state, api_config);

    let addr = server_config.server.socket_addr()?;
    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber.with(fmt::layer().pretty().with_target(true)).init();
        }
    }

    Ok(())
}

/// Build the reconciler over the configured store
async fn init_ledger(config: &ServerConfig, dev_mode: bool) -> anyhow::Result<Reconciler> {
    if dev_mode {
        tracing::warn!("Dev mode: using a seeded in-memory store, nothing will be persisted");
        let store = MemoryStore::new();
        seed_dev_donations(&store).await;
        return Ok(Reconciler::new(Arc::new(store.clone()), Arc::new(store)));
    }

    let store = SqliteStore::connect(&config.database.sqlite_url).await?;
    Ok(Reconciler::new(Arc::new(store.clone()), Arc::new(store)))
}

/// A couple of donations so the dev dashboard has something to show
async fn seed_dev_donations(store: &MemoryStore) {
    for (name, amount) in [("Asha", dec!(1000)), ("Ravi", dec!(250.50))] {
        store
            .record_donation(Donation {
                id: DonationId::new(),
                name: name.to_string(),
                amount,
                timestamp: Utc::now(),
            })
            .await;
    }
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    // Allow time for in-flight requests to complete
    tokio::time::sleep(timeout).await;
}
