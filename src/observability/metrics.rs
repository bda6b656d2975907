//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_inspections_total` (counter): inspected requests by audit status
//! - `edge_rate_limited_total` (counter): rejected requests
//! - `edge_intrusion_signatures_total` (counter): hits by signature name
//! - `edge_geo_lookups_total` (counter): lookups by outcome
//! - `edge_inspection_faults_total` (counter): failed-open inspections
//! - `edge_audit_lines` (gauge): lines held in the audit buffer
//! - `edge_rate_limit_entries` (gauge): tracked rate limit windows
//! - `edge_upstream_requests_total` (counter): forwarded requests by status
//! - `edge_upstream_duration_seconds` (histogram): upstream latency
//!
//! Recording is a no-op until a recorder is installed, so tests need no setup.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_inspection(status: &'static str) {
    counter!("edge_inspections_total", "status" => status).increment(1);
}

pub fn record_rate_limited() {
    counter!("edge_rate_limited_total").increment(1);
}

pub fn record_intrusion(signature: &'static str) {
    counter!("edge_intrusion_signatures_total", "signature" => signature).increment(1);
}

pub fn record_geo_lookup(outcome: &'static str) {
    counter!("edge_geo_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_inspection_fault() {
    counter!("edge_inspection_faults_total").increment(1);
}

pub fn record_audit_size(lines: usize) {
    gauge!("edge_audit_lines").set(lines as f64);
}

pub fn record_rate_limit_entries(entries: usize) {
    gauge!("edge_rate_limit_entries").set(entries as f64);
}

pub fn record_upstream(status: u16, start: Instant) {
    counter!("edge_upstream_requests_total", "status" => status.to_string()).increment(1);
    histogram!("edge_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}
