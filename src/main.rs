//! User relay.
//!
//! A thin HTTP relay built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!                         │                  USER RELAY                   │
//!                         │                                               │
//!     GET /users/{id}     │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│  users   │───▶│ upstream │──┼──▶ User
//!                         │  │ server  │    │ handler  │    │  client  │  │    Directory
//!                         │  └─────────┘    └────┬─────┘    └──────────┘  │
//!                         │                      │                        │
//!     200 User / envelope │               ┌──────▼──────┐                 │
//!     ◀───────────────────┼───────────────│  response   │                 │
//!                         │               │ JSON + CORS │                 │
//!                         │               └─────────────┘                 │
//!                         │                                               │
//!                         │  config · observability · lifecycle           │
//!                         └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use user_relay::config::load_config;
use user_relay::lifecycle::{signals, Shutdown};
use user_relay::observability::{logging, metrics};
use user_relay::HttpServer;

#[derive(Parser)]
#[command(name = "user-relay")]
#[command(about = "Relays /users/{id} lookups to an upstream user directory", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port; overrides both the config file and PORT.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.port)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("user-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.base_url,
        upstream_timeout_secs = config.upstream.timeout_secs,
        request_timeout_secs = config.timeouts.request_secs,
        cors_on_errors = config.cors.include_on_errors,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
