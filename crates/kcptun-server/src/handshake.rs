//! Per-connection IV handshake.
//!
//! The client opens every physical connection with `IV_LEN` raw bytes. The
//! read is bounded by a deadline; once the IV is in, no deadline applies to
//! the rest of the connection.

use std::fmt;
use std::time::Duration;

use kcptun_core::defaults::IV_LEN;
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("timed out after {0:?} waiting for iv")]
    Timeout(Duration),
    #[error("reading iv: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialization vector sent by the client.
#[derive(Clone, PartialEq, Eq)]
pub struct Iv([u8; IV_LEN]);

impl Iv {
    pub fn from_bytes(bytes: [u8; IV_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }
}

impl fmt::Debug for Iv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Iv(..)")
    }
}

/// Read exactly `IV_LEN` bytes from `conn` within `timeout`.
///
/// Bytes after the IV are left unread for the session layer.
pub async fn read_iv<S>(conn: &mut S, timeout: Duration) -> Result<Iv, HandshakeError>
where
    S: AsyncRead + Unpin,
{
    let mut iv = [0u8; IV_LEN];
    tokio::time::timeout(timeout, conn.read_exact(&mut iv))
        .await
        .map_err(|_| HandshakeError::Timeout(timeout))??;
    Ok(Iv(iv))
}
