//! Pluggable transport abstraction for kcptun-rs.
//!
//! Defines traits for accepting inbound physical connections and for dialing
//! backends, so the session layer works the same over KCP, plain TCP, or an
//! in-memory fake in tests.
//!
//! # Transports
//!
//! - [`kcp`]: KCP over UDP, tuned by a named mode preset.
//! - [`tcp`]: Plain TCP listener and the backend connector.

pub mod error;
pub mod kcp;
pub mod tcp;

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncWrite};

pub use error::TransportError;
pub use kcp::{KcpMode, KcpSettings, KcpTransportListener};
pub use tcp::{TcpConnector, TcpTransportListener};

/// Marker trait for streams usable by the session and relay layers.
pub trait TransportStream: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send + 'static> TransportStream for T {}

/// Accepts inbound physical connections.
pub trait TransportListener: Send + 'static {
    /// The stream type produced by this listener.
    type Stream: TransportStream;

    /// Wait for the next connection and its remote address.
    fn accept(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(Self::Stream, SocketAddr), TransportError>> + Send + '_>>;

    /// Address the listener is bound to.
    fn local_addr(&self) -> Result<SocketAddr, TransportError>;
}

/// Connects outbound to a target address, producing a transport stream.
pub trait TransportConnector: Clone + Send + Sync + 'static {
    /// The stream type produced by this connector.
    type Stream: TransportStream;

    /// Connect to the given `host:port` address.
    fn connect(
        &self,
        addr: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Stream, TransportError>> + Send + '_>>;
}
