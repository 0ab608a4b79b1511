//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define site metrics (requests, latency, renders, route table)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `site_requests_total` (counter): requests by method, status, route
//! - `site_request_duration_seconds` (histogram): latency distribution
//! - `site_renders_total` (counter): renders by policy mode and cache status
//! - `site_route_table_entries` (gauge): pages in the active table
//! - `site_route_reloads_total` (counter): reload attempts by result
//!
//! # Design Decisions
//! - Labels use route patterns, never concrete paths (bounded cardinality)
//! - Without an installed recorder every call is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::policy::RenderingPolicy;
use crate::render::CacheStatus;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    metrics::counter!(
        "site_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    metrics::histogram!("site_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record how a page was produced.
pub fn record_render(policy: &RenderingPolicy, status: CacheStatus) {
    metrics::counter!(
        "site_renders_total",
        "mode" => policy.label(),
        "cache" => status.as_str()
    )
    .increment(1);
}

/// Record the size of the active route table.
pub fn record_route_table(entries: usize) {
    metrics::gauge!("site_route_table_entries").set(entries as f64);
}

/// Record a route source reload attempt.
pub fn record_route_reload(result: &'static str) {
    metrics::counter!("site_route_reloads_total", "result" => result).increment(1);
}
