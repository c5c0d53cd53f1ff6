//! Asset mirror (caching asset-rewriting reverse proxy)
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                 ASSET MIRROR                    │
//!                    │                                                 │
//!   Client Request   │  ┌─────────┐    ┌─────────┐    ┌───────────┐   │
//!   ─────────────────┼─▶│  http   │───▶│  fetch  │───▶│ cache     │   │
//!                    │  │ server  │    │ origin  │    │ store     │   │
//!                    │  └────┬────┘    └────┬────┘    └───────────┘   │
//!                    │       │              │ miss                    │
//!                    │       ▼              ▼                         │
//!                    │  ┌─────────┐    ┌──────────┐                   │
//!                    │  │ routing │    │  origin  │◀──────────────────┼──── Content
//!                    │  │  class  │    │   GET    │                   │     Origin
//!                    │  └────┬────┘    └──────────┘                   │
//!                    │       │ html                                   │
//!                    │       ▼                                        │
//!   Client Response  │  ┌───────────────────────────┐                 │
//!   ◀────────────────┼──│ transform: rewrite+compose │                │
//!                    │  └───────────────────────────┘                 │
//!                    │                                                 │
//!                    │  Cross-cutting: config, observability           │
//!                    └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use asset_mirror::config::loader;
use asset_mirror::observability::{logging, metrics};
use asset_mirror::{MemoryCacheStore, MirrorServer};

#[derive(Parser, Debug)]
#[command(
    name = "asset-mirror",
    about = "Caching reverse proxy that rewrites origin references"
)]
struct Args {
    /// Path to a TOML config file. Without it, configuration comes from
    /// defaults plus ASSET_MIRROR_* environment variables.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => loader::load_from_env()?,
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.base_url,
        cdn = %config.origin.cdn_url.as_deref().unwrap_or("<origin-relative>"),
        cache_ttl_secs = config.origin.cache_ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let cache = Arc::new(MemoryCacheStore::new());
    let server = MirrorServer::new(Arc::new(config), cache, None)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
