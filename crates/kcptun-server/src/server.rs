//! Main accept loop.

use std::net::SocketAddr;
use std::sync::Arc;

use kcptun_config::{Config, parse_listen_addr};
use kcptun_core::ERROR_TRANSPORT;
use kcptun_metrics::{record_error, record_session_accepted, record_session_closed};
use kcptun_transport::{
    KcpMode, KcpSettings, KcpTransportListener, TcpConnector, TcpTransportListener,
    TransportConnector, TransportListener,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::error::ServerError;
use crate::session::handle_connection;
use crate::state::ServerState;

/// Run the server until `shutdown` is cancelled.
///
/// Binds the configured transport and serves every physical connection in
/// its own task. Sessions still running when the token fires are not drained.
pub async fn run_with_shutdown(config: Config, shutdown: CancellationToken) -> Result<(), ServerError> {
    let state = Arc::new(ServerState::from_config(&config)?);
    let listen: SocketAddr = parse_listen_addr(&config.server.listen)
        .map_err(|_| ServerError::Config("invalid listen address".into()))?;
    let connector = TcpConnector::new();

    match config.server.transport.as_str() {
        "kcp" => {
            let settings = KcpSettings {
                mode: config.kcp.mode.parse::<KcpMode>()?,
                mtu: config.kcp.mtu,
                sndwnd: config.kcp.sndwnd,
                rcvwnd: config.kcp.rcvwnd,
            };
            let listener = KcpTransportListener::bind(listen, &settings).await?;
            info!(address = %listener.local_addr()?, "listening on kcp");
            info!(mode = %settings.mode, "communication mode");
            info!(sndwnd = settings.sndwnd, rcvwnd = settings.rcvwnd, mtu = settings.mtu, "kcp windows");
            warn!("kcp packet-level encryption is not available; only tuncrypt protects the stream");
            info!(tuncrypt = state.tuncrypt, target = %state.target, "tunnel encryption");
            serve(listener, connector, state, shutdown).await
        }
        "tcp" => {
            let listener = TcpTransportListener::bind(listen, config.server.connection_backlog)?;
            info!(
                address = %listener.local_addr()?,
                backlog = config.server.connection_backlog,
                "listening on tcp"
            );
            info!(tuncrypt = state.tuncrypt, target = %state.target, "tunnel encryption");
            serve(listener, connector, state, shutdown).await
        }
        other => Err(ServerError::Config(format!("unknown transport: {other}"))),
    }
}

/// Accept physical connections from `listener` until `shutdown` is cancelled.
pub async fn serve<L, C>(
    mut listener: L,
    connector: C,
    state: Arc<ServerState>,
    shutdown: CancellationToken,
) -> Result<(), ServerError>
where
    L: TransportListener,
    C: TransportConnector,
{
    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("shutdown signal received, stopping accept loop");
                break;
            }

            result = listener.accept() => {
                let (conn, peer) = match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        record_error(ERROR_TRANSPORT);
                        warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                info!(peer = %peer, "remote address");

                let state = state.clone();
                let connector = connector.clone();
                tokio::spawn(
                    async move {
                        record_session_accepted();
                        let start = Instant::now();
                        let result = handle_connection(conn, peer, state, connector).await;
                        let duration_secs = start.elapsed().as_secs_f64();
                        record_session_closed(duration_secs);

                        match result {
                            Ok(end) => debug!(peer = %peer, duration_secs, end = ?end, "session ended"),
                            Err(err) => {
                                record_error(err.error_type());
                                warn!(peer = %peer, duration_secs, error = %err, "connection closed with error");
                            }
                        }
                    }
                    .instrument(info_span!("session", peer = %peer)),
                );
            }
        }
    }

    info!("server stopped");
    Ok(())
}
