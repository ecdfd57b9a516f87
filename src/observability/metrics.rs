//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sitewrap_requests_total` (counter): requests by method, status and
//!   outcome (`transformed`, `passthrough`, `error`)
//! - `sitewrap_request_duration_seconds` (histogram): latency by outcome
//!
//! # Design Decisions
//! - Prometheus exporter on its own listener, gated by config
//! - Low-cardinality labels only; no per-path series

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(error) => tracing::error!(error = %error, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, outcome: &str, start: Instant) {
    metrics::counter!(
        "sitewrap_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
    metrics::histogram!(
        "sitewrap_request_duration_seconds",
        "outcome" => outcome.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}
