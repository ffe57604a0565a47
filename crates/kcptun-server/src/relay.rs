//! Logical stream ⇄ backend relay with Prometheus metrics.
//!
//! This module wraps the generic relay from `kcptun-core` with the
//! `stream opened` / `stream closed` log lines and metrics recording.

use std::net::SocketAddr;

use kcptun_core::ERROR_IO;
use kcptun_core::io::{RelayMetrics, RelayOutcome, relay_until_closed};
use kcptun_metrics::{
    record_bytes_inbound, record_bytes_outbound, record_error, record_stream_closed,
    record_stream_opened,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

/// Metrics recorder for global bytes tracking.
struct GlobalMetrics;

impl RelayMetrics for GlobalMetrics {
    #[inline]
    fn record_inbound(&self, bytes: u64) {
        record_bytes_inbound(bytes);
    }
    #[inline]
    fn record_outbound(&self, bytes: u64) {
        record_bytes_outbound(bytes);
    }
}

/// Relay `stream` to `backend` until either side closes, then close both.
pub async fn relay_stream<A, B>(
    stream: A,
    backend: B,
    buffer_size: usize,
    peer: SocketAddr,
) -> RelayOutcome
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    info!(peer = %peer, "stream opened");
    record_stream_opened();

    let outcome = relay_until_closed(stream, backend, buffer_size, &GlobalMetrics).await;

    record_stream_closed();
    if let Some(err) = &outcome.error {
        record_error(ERROR_IO);
        debug!(peer = %peer, direction = %outcome.first_closed, error = %err, "relay direction failed");
    }
    info!(
        peer = %peer,
        closed_by = %outcome.first_closed,
        inbound_bytes = outcome.inbound_bytes,
        outbound_bytes = outcome.outbound_bytes,
        "stream closed"
    );
    outcome
}
