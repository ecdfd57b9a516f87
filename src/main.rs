//! sitewrap: serve-time chrome injection for static HTML sites.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌────────────────────────────────────────────────┐
//!                   │                   SITEWRAP                     │
//!                   │                                                │
//!   Client Request  │  ┌────────┐   ┌─────────────┐                  │
//!   ────────────────┼─▶│  http  │──▶│ origin fetch│────────────────┐ │
//!                   │  │ server │   │ (passthrough│                │ │
//!                   │  └────────┘   │  non-HTML)  │                ▼ │
//!                   │               └─────────────┘        ┌────────┐│
//!                   │  ┌────────┐  ┌──────────┐            │ origin ││
//!                   │  │ assets │  │ routing/ │            │  site  ││
//!                   │  │ probes │  │freshness │            └────────┘│
//!                   │  └───┬────┘  └────┬─────┘                      │
//!                   │      └─────┬──────┘                            │
//!                   │            ▼                                   │
//!   Client Response │  ┌─────────────────┐   ┌──────────────────┐    │
//!   ◀───────────────┼──│    finalizer    │◀──│ rewrite pipeline │    │
//!                   │  │ (validators,    │   │ (one streaming   │    │
//!                   │  │  cache policy)  │   │  lol_html pass)  │    │
//!                   │  └─────────────────┘   └──────────────────┘    │
//!                   └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use sitewrap::config::{load_config, SitewrapConfig};
use sitewrap::http::HttpServer;
use sitewrap::lifecycle::{trigger_on_ctrl_c, Shutdown};
use sitewrap::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "sitewrap", about = "Serve-time chrome injection proxy")]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SitewrapConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.base_url,
        asset_store = %config.asset_store.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
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

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(trigger_on_ctrl_c(shutdown));

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
