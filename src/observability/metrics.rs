//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define resolver metrics (updates, resolutions, skipped routes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `xds_route_updates_total` (counter): route configuration updates by result
//! - `xds_route_resolutions_total` (counter): per-RPC lookups by outcome
//! - `xds_routes_skipped_total` (counter): routes dropped for unsupported features
//! - `xds_routes_active` (gauge): routes in the published table
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels are fixed, low-cardinality strings

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// `result` is `accepted` or `rejected`.
pub fn record_route_update(result: &'static str) {
    counter!("xds_route_updates_total", "result" => result).increment(1);
}

/// `outcome` is `matched`, `no_match` or `not_loaded`.
pub fn record_resolution(outcome: &'static str) {
    counter!("xds_route_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_routes_skipped(count: usize) {
    counter!("xds_routes_skipped_total").increment(count as u64);
}

pub fn set_routes_active(count: usize) {
    gauge!("xds_routes_active").set(count as f64);
}
