//! Metrics collection and exposition.
//!
//! # Metrics
//! - `frontdoor_connections_total` (counter): dispatched connections by protocol, outcome
//! - `frontdoor_websocket_sessions` (gauge): live websocket sessions
//! - `frontdoor_order_messages_total` (counter): frames relayed into order groups
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint and install it as the global recorder.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Count one dispatch decision.
pub fn record_dispatch(protocol: &str, outcome: &'static str) {
    metrics::counter!(
        "frontdoor_connections_total",
        "protocol" => protocol.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn set_websocket_sessions(count: u64) {
    metrics::gauge!("frontdoor_websocket_sessions").set(count as f64);
}

/// Count one frame published to an order group.
pub fn record_order_message() {
    metrics::counter!("frontdoor_order_messages_total").increment(1);
}
