//! Vivu flight booking API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::auth ──▶ http::request ──▶ routes
//!                      (timeout,        (bearer        (inbound           │
//!                       body limit,      token)         normalization)    ▼
//!                       request id,                                     store
//!                       tracing)                                          │
//!     Client Response                                                     │
//!     ◀────────────── http::response ◀────────────────────────────────────┘
//!                      (outbound normalization, JSON)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use vivu_api::config::{load_config, AppConfig};
use vivu_api::datetime;
use vivu_api::lifecycle::Shutdown;
use vivu_api::observability::{logging, metrics};
use vivu_api::store::{seed, DocumentStore};
use vivu_api::HttpServer;

#[derive(Parser)]
#[command(name = "vivu-api")]
#[command(about = "Flight booking REST API", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "vivu-api starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        max_depth = config.normalization.max_depth,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation has already checked the address.
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(DocumentStore::new());
    if config.store.seed_demo_data {
        seed::seed_demo_data(&store, datetime::now().date_naive());
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::with_store(&config, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
