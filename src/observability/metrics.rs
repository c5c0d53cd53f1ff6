//! Metrics collection and exposition.
//!
//! # Metrics
//! - `asset_mirror_requests_total` (counter): requests by content class, status
//! - `asset_mirror_request_duration_seconds` (histogram): latency distribution
//! - `asset_mirror_cache_lookups_total` (counter): cache hits/misses
//! - `asset_mirror_origin_fetch_total` (counter): origin responses by status
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Prometheus-compatible exposition on a dedicated listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(error) => tracing::error!(error = %error, "Failed to install metrics exporter"),
    }
}

/// Record a completed inbound request.
pub fn record_request(class: &str, status: u16, start: Instant) {
    counter!(
        "asset_mirror_requests_total",
        "class" => class.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("asset_mirror_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a cache-aside lookup outcome.
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("asset_mirror_cache_lookups_total", "result" => result).increment(1);
}

/// Record an origin fetch by response status.
pub fn record_origin_fetch(status: u16) {
    counter!("asset_mirror_origin_fetch_total", "status" => status.to_string()).increment(1);
}
