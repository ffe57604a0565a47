//! Per-connection session handling.
//!
//! A physical connection goes through the IV handshake, is optionally wrapped
//! in the cipher, and becomes a server-role multiplexed session. Every logical
//! stream the peer opens is paired with a fresh backend connection and handed
//! to its own relay task.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use kcptun_metrics::{record_error, record_handshake_duration};
use kcptun_transport::{TransportConnector, TransportStream};
use tokio::time::Instant;
use tracing::{Instrument, debug, info, warn};

use crate::cipher::{CipherRole, SecureStream};
use crate::error::ServerError;
use crate::handshake::read_iv;
use crate::mux::{Multiplexer, YamuxMux};
use crate::relay::relay_stream;
use crate::state::ServerState;

/// What a failed backend dial does to the session that accepted the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialFailurePolicy {
    /// Drop the stream and tear down the whole session.
    #[default]
    CloseSession,
    /// Drop only the stream and keep accepting.
    CloseStream,
}

impl FromStr for DialFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "close-session" => Ok(DialFailurePolicy::CloseSession),
            "close-stream" => Ok(DialFailurePolicy::CloseStream),
            other => Err(format!("unknown dial failure policy: {other}")),
        }
    }
}

impl fmt::Display for DialFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialFailurePolicy::CloseSession => f.write_str("close-session"),
            DialFailurePolicy::CloseStream => f.write_str("close-stream"),
        }
    }
}

/// Why a session stopped accepting streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// A backend dial failed under [`DialFailurePolicy::CloseSession`].
    DialFailed,
    /// The multiplexer could not accept another stream.
    AcceptFailed,
}

/// Accept logical streams from `mux` until it fails or a dial ends the session.
///
/// The multiplexer is dropped on return, closing the physical connection.
/// Relays already spawned own their streams and are not waited for.
pub async fn serve_session<M, C>(
    mut mux: M,
    connector: C,
    target: &str,
    policy: DialFailurePolicy,
    relay_buffer_size: usize,
    peer: SocketAddr,
) -> SessionEnd
where
    M: Multiplexer,
    C: TransportConnector,
{
    loop {
        let stream = match mux.accept().await {
            Ok(stream) => stream,
            Err(e) => {
                let err = ServerError::Accept(e);
                record_error(err.error_type());
                info!(peer = %peer, error = %err, "session closed");
                return SessionEnd::AcceptFailed;
            }
        };

        match connector.connect(target).await {
            Ok(backend) => {
                tokio::spawn(
                    relay_stream(stream, backend, relay_buffer_size, peer).in_current_span(),
                );
            }
            Err(source) => {
                let err = ServerError::Dial {
                    target: target.to_string(),
                    source,
                };
                record_error(err.error_type());
                warn!(peer = %peer, policy = %policy, error = %err, "backend dial failed");
                drop(stream);
                if policy == DialFailurePolicy::CloseSession {
                    return SessionEnd::DialFailed;
                }
            }
        }
    }
}

/// Serve one physical connection from handshake to session end.
pub async fn handle_connection<S, C>(
    mut conn: S,
    peer: SocketAddr,
    state: Arc<ServerState>,
    connector: C,
) -> Result<SessionEnd, ServerError>
where
    S: TransportStream,
    C: TransportConnector,
{
    let start = Instant::now();
    let iv = read_iv(&mut conn, state.handshake_timeout).await?;
    record_handshake_duration(start.elapsed().as_secs_f64());
    debug!(peer = %peer, tuncrypt = state.tuncrypt, "iv received");

    let mux = if state.tuncrypt {
        let secure = SecureStream::new(conn, &state.key, &iv, CipherRole::Server)?;
        YamuxMux::server(secure, &state.mux)?
    } else {
        YamuxMux::server(conn, &state.mux)?
    };
    let end = serve_session(
        mux,
        connector,
        &state.target,
        state.dial_failure,
        state.relay_buffer_size,
        peer,
    )
    .await;
    Ok(end)
}
