//! Plain TCP transport (no encryption).
//!
//! The listener side is useful for testing or trusted-network scenarios
//! where KCP is not wanted; the connector dials every backend.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

use crate::error::TransportError;
use crate::{TransportConnector, TransportListener};

/// TCP listener bound with a custom backlog.
#[derive(Debug)]
pub struct TcpTransportListener {
    inner: TcpListener,
}

impl TcpTransportListener {
    /// Bind `addr` with the given accept backlog.
    pub fn bind(addr: SocketAddr, backlog: u32) -> Result<Self, TransportError> {
        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };
        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&addr.into())?;
        socket.listen(backlog.min(i32::MAX as u32) as i32)?;
        let inner = TcpListener::from_std(std::net::TcpListener::from(socket))?;
        debug!(addr = %addr, backlog, "tcp listener bound");
        Ok(Self { inner })
    }
}

impl TransportListener for TcpTransportListener {
    type Stream = TcpStream;

    fn accept(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(Self::Stream, SocketAddr), TransportError>> + Send + '_>>
    {
        Box::pin(async move {
            let (tcp, peer) = self.inner.accept().await?;
            tcp.set_nodelay(true)?;
            Ok((tcp, peer))
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.inner.local_addr()?)
    }
}

/// Plain TCP connector, used to dial the backend for every logical stream.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector;

impl TcpConnector {
    pub fn new() -> Self {
        Self
    }
}

impl TransportConnector for TcpConnector {
    type Stream = TcpStream;

    fn connect(
        &self,
        addr: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Stream, TransportError>> + Send + '_>> {
        let addr = addr.to_string();
        Box::pin(async move {
            let tcp = TcpStream::connect(&addr).await?;
            tcp.set_nodelay(true)?;
            Ok(tcp)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn listener_accepts_connector() {
        let mut listener = TcpTransportListener::bind("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let mut stream = TcpConnector::new().connect(&addr.to_string()).await.unwrap();
            stream.write_all(b"ping").await.unwrap();
            let mut buf = [0u8; 4];
            stream.read_exact(&mut buf).await.unwrap();
            buf
        });

        let (mut conn, peer) = listener.accept().await.unwrap();
        assert!(peer.ip().is_loopback());
        let mut buf = [0u8; 4];
        conn.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");
        conn.write_all(b"pong").await.unwrap();

        assert_eq!(&client.await.unwrap(), b"pong");
    }

    #[tokio::test]
    async fn connector_reports_refused() {
        // Grab a free port, then close it so nothing listens there.
        let addr = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap()
        };
        let result = TcpConnector::new().connect(&addr.to_string()).await;
        assert!(matches!(result, Err(TransportError::Io(_))));
    }
}
