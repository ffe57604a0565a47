//! Stream multiplexer seam and its yamux implementation.
//!
//! A [`Multiplexer`] owns one physical connection and yields logical streams
//! until the connection fails or closes. Dropping it closes the connection
//! and every stream it still owns.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use futures::StreamExt;
use kcptun_config::MuxConfig;
use kcptun_core::defaults;
use kcptun_transport::TransportStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_yamux::config::Config as YamuxConfig;
use tokio_yamux::session::Session;
use tokio_yamux::stream::StreamHandle;
use tracing::{Instrument, debug, warn};

use crate::error::ServerError;

/// Server-side source of logical streams.
pub trait Multiplexer: Send + 'static {
    /// The logical stream type.
    type Stream: TransportStream;

    /// Wait for the peer to open the next logical stream.
    ///
    /// An error means the session is unusable.
    fn accept(&mut self) -> Pin<Box<dyn Future<Output = io::Result<Self::Stream>> + Send + '_>>;
}

/// yamux session tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxSettings {
    pub accept_backlog: usize,
    pub keepalive: bool,
    pub keepalive_interval: Duration,
    pub write_timeout: Duration,
    pub max_stream_window: u32,
}

impl Default for MuxSettings {
    fn default() -> Self {
        Self {
            accept_backlog: defaults::DEFAULT_MUX_ACCEPT_BACKLOG,
            keepalive: defaults::DEFAULT_MUX_KEEPALIVE,
            keepalive_interval: Duration::from_secs(defaults::DEFAULT_MUX_KEEPALIVE_INTERVAL_SECS),
            write_timeout: Duration::from_secs(defaults::DEFAULT_MUX_WRITE_TIMEOUT_SECS),
            max_stream_window: defaults::DEFAULT_MUX_MAX_STREAM_WINDOW,
        }
    }
}

impl MuxSettings {
    pub fn from_config(config: &MuxConfig) -> Self {
        Self {
            accept_backlog: config.accept_backlog,
            keepalive: config.keepalive,
            keepalive_interval: Duration::from_secs(config.keepalive_interval_secs),
            write_timeout: Duration::from_secs(config.write_timeout_secs),
            max_stream_window: config.max_stream_window,
        }
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.accept_backlog == 0 {
            return Err(ServerError::Mux("accept backlog must be positive".into()));
        }
        if self.keepalive && self.keepalive_interval.is_zero() {
            return Err(ServerError::Mux(
                "keep-alive interval must be positive".into(),
            ));
        }
        if self.write_timeout.is_zero() {
            return Err(ServerError::Mux(
                "connection write timeout must be positive".into(),
            ));
        }
        if self.max_stream_window < defaults::MIN_MUX_STREAM_WINDOW {
            return Err(ServerError::Mux(format!(
                "max stream window must be at least {}",
                defaults::MIN_MUX_STREAM_WINDOW
            )));
        }
        Ok(())
    }

    pub fn to_yamux_config(&self) -> YamuxConfig {
        let mut config = YamuxConfig::default();
        config.accept_backlog = self.accept_backlog;
        config.enable_keepalive = self.keepalive;
        config.keepalive_interval = self.keepalive_interval;
        config.connection_write_timeout = self.write_timeout;
        config.max_stream_window_size = self.max_stream_window;
        config
    }
}

/// Server-role yamux session over a physical connection.
///
/// A driver task owns the session and keeps it polled, so established
/// streams make progress while the owner is busy between accepts. New
/// streams wait in a queue of `accept_backlog` entries; streams arriving
/// when it is full are dropped.
pub struct YamuxMux {
    incoming: mpsc::Receiver<io::Result<StreamHandle>>,
}

impl YamuxMux {
    /// Wrap `conn` in a server-role session. Invalid settings are rejected
    /// before the connection is touched.
    pub fn server<S: TransportStream>(conn: S, settings: &MuxSettings) -> Result<Self, ServerError> {
        settings.validate()?;
        let session = Session::new_server(conn, settings.to_yamux_config());
        let (tx, incoming) = mpsc::channel(settings.accept_backlog);
        tokio::spawn(drive_session(session, tx).in_current_span());
        Ok(Self { incoming })
    }
}

/// Poll `session` until it ends or the receiving side is dropped. The
/// session, and with it the physical connection, is dropped on return.
async fn drive_session<S: TransportStream>(
    mut session: Session<S>,
    tx: mpsc::Sender<io::Result<StreamHandle>>,
) {
    loop {
        tokio::select! {
            _ = tx.closed() => break,
            next = session.next() => match next {
                Some(Ok(stream)) => match tx.try_send(Ok(stream)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => warn!("accept backlog full, dropping stream"),
                    Err(TrySendError::Closed(_)) => break,
                },
                Some(Err(e)) => {
                    let _ = tx.try_send(Err(e));
                    break;
                }
                None => break,
            },
        }
    }
    debug!("mux session ended");
}

impl Multiplexer for YamuxMux {
    type Stream = StreamHandle;

    fn accept(&mut self) -> Pin<Box<dyn Future<Output = io::Result<Self::Stream>> + Send + '_>> {
        Box::pin(async move {
            match self.incoming.recv().await {
                Some(result) => result,
                None => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "session closed by peer",
                )),
            }
        })
    }
}
