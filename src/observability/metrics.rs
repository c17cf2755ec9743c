//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_cache_lookups_total` (counter): by `result` = hit, miss, bypass
//! - `proxy_origin_fetches_total` (counter): by `outcome` = success, error
//! - `proxy_cache_writes_total` (counter): by `outcome` = success, error
//! - `proxy_responses_total` (counter): by `status`
//! - `proxy_active_connections` (gauge): connections currently being handled
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Outcome of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Hit,
    Miss,
    /// Key not cacheable; went straight to the origin.
    Bypass,
}

impl Lookup {
    fn as_str(self) -> &'static str {
        match self {
            Lookup::Hit => "hit",
            Lookup::Miss => "miss",
            Lookup::Bypass => "bypass",
        }
    }
}

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_cache_lookup(lookup: Lookup) {
    counter!("proxy_cache_lookups_total", "result" => lookup.as_str()).increment(1);
}

pub fn record_origin_fetch(success: bool) {
    counter!("proxy_origin_fetches_total", "outcome" => outcome(success)).increment(1);
}

pub fn record_cache_write(success: bool) {
    counter!("proxy_cache_writes_total", "outcome" => outcome(success)).increment(1);
}

pub fn record_response(status: u16) {
    counter!("proxy_responses_total", "status" => status.to_string()).increment(1);
}

pub fn record_active_connections(count: u64) {
    gauge!("proxy_active_connections").set(count as f64);
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}
