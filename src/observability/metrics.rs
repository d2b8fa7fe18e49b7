//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by outcome
//! - `gate_request_duration_seconds` (histogram): end-to-end latency by outcome
//! - `gate_risk_checks_total` (counter): risk calls by verdict
//! - `gate_risk_check_duration_seconds` (histogram): risk call latency by verdict
//!
//! Recording without an installed exporter is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()
}

/// Record one handled request.
pub fn record_request(outcome: &'static str, start: Instant) {
    metrics::counter!("gate_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("gate_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record one risk provider call.
pub fn record_risk_check(verdict: &'static str, start: Instant) {
    metrics::counter!("gate_risk_checks_total", "verdict" => verdict).increment(1);
    metrics::histogram!("gate_risk_check_duration_seconds", "verdict" => verdict)
        .record(start.elapsed().as_secs_f64());
}
