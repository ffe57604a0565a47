//! Metrics collection and Prometheus exporter for kcptun-rs.
//!
//! This module provides metrics instrumentation for the tunnel server,
//! including session and stream counts, bytes relayed, and error rates.

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Initialize Prometheus metrics exporter.
///
/// Starts an HTTP server on the given address to expose metrics.
/// Returns an error message if binding fails.
pub fn init_prometheus(listen: &str) -> Result<(), String> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| format!("invalid metrics listen address: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install prometheus exporter: {}", e))?;

    Ok(())
}

// ============================================================================
// Metric Names
// ============================================================================

/// Total number of physical connections accepted from the transport.
pub const SESSIONS_TOTAL: &str = "kcptun_sessions_total";
/// Number of physical connections currently being served.
pub const SESSIONS_ACTIVE: &str = "kcptun_sessions_active";
/// Session lifetime histogram (seconds).
pub const SESSION_DURATION_SECONDS: &str = "kcptun_session_duration_seconds";
/// Total number of logical streams relayed to the backend.
pub const STREAMS_TOTAL: &str = "kcptun_streams_total";
/// Number of relays currently running.
pub const STREAMS_ACTIVE: &str = "kcptun_streams_active";
/// Total bytes copied from logical streams to the backend.
pub const BYTES_INBOUND_TOTAL: &str = "kcptun_bytes_inbound_total";
/// Total bytes copied from the backend to logical streams.
pub const BYTES_OUTBOUND_TOTAL: &str = "kcptun_bytes_outbound_total";
/// Total number of errors by type.
pub const ERRORS_TOTAL: &str = "kcptun_errors_total";
/// IV handshake duration histogram (seconds).
pub const HANDSHAKE_DURATION_SECONDS: &str = "kcptun_handshake_duration_seconds";

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a new physical connection accepted.
#[inline]
pub fn record_session_accepted() {
    counter!(SESSIONS_TOTAL).increment(1);
    gauge!(SESSIONS_ACTIVE).increment(1.0);
}

/// Record a physical connection finished.
#[inline]
pub fn record_session_closed(duration_secs: f64) {
    gauge!(SESSIONS_ACTIVE).decrement(1.0);
    histogram!(SESSION_DURATION_SECONDS).record(duration_secs);
}

/// Record a logical stream paired with a backend connection.
#[inline]
pub fn record_stream_opened() {
    counter!(STREAMS_TOTAL).increment(1);
    gauge!(STREAMS_ACTIVE).increment(1.0);
}

/// Record a relay torn down.
#[inline]
pub fn record_stream_closed() {
    gauge!(STREAMS_ACTIVE).decrement(1.0);
}

/// Record bytes copied stream → backend.
#[inline]
pub fn record_bytes_inbound(bytes: u64) {
    counter!(BYTES_INBOUND_TOTAL).increment(bytes);
}

/// Record bytes copied backend → stream.
#[inline]
pub fn record_bytes_outbound(bytes: u64) {
    counter!(BYTES_OUTBOUND_TOTAL).increment(bytes);
}

/// Record an error by type.
#[inline]
pub fn record_error(error_type: &'static str) {
    counter!(ERRORS_TOTAL, "type" => error_type).increment(1);
}

/// Record IV handshake duration.
#[inline]
pub fn record_handshake_duration(duration_secs: f64) {
    histogram!(HANDSHAKE_DURATION_SECONDS).record(duration_secs);
}
