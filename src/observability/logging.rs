//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Honor the verbose config flag and RUST_LOG overrides
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - RUST_LOG, when set, wins over the config flag

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ObservabilityConfig;

/// Initialize the logging subsystem.
pub fn init_logging(config: &ObservabilityConfig) {
    let default_filter = if config.verbose {
        "asset_mirror=debug,tower_http=debug"
    } else {
        "asset_mirror=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
