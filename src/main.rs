//! Edge inspector
//!
//! ```text
//!   client ──▶ request id ─▶ trace ─▶ timeout ─▶ inspection ──▶ /api/* handlers
//!                                                   │        └─▶ upstream app
//!                                                   └─▶ 429 (rate limited)
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use edge_inspector::config::{default_config, load_config};
use edge_inspector::lifecycle::{signals::wait_for_signal, Shutdown};
use edge_inspector::observability::{logging, metrics};
use edge_inspector::HttpServer;

#[derive(Parser)]
#[command(name = "edge-inspector")]
#[command(about = "Request-inspecting edge proxy for the security dashboard", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-inspector starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        geolocation = config.geolocation.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let server_task = tokio::spawn(server.run(listener, server_shutdown));
    wait_for_signal(&shutdown).await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
