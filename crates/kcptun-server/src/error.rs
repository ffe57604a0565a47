//! Server error types.

use kcptun_core::{
    ERROR_ACCEPT, ERROR_CIPHER, ERROR_CONFIG, ERROR_DIAL, ERROR_HANDSHAKE, ERROR_IO, ERROR_MUX,
    ERROR_TIMEOUT, ERROR_TRANSPORT,
};
use kcptun_transport::TransportError;

use crate::cipher::CipherError;
use crate::handshake::HandshakeError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("handshake: {0}")]
    Handshake(#[from] HandshakeError),
    #[error("cipher: {0}")]
    Cipher(#[from] CipherError),
    #[error("mux: {0}")]
    Mux(String),
    #[error("mux accept: {0}")]
    Accept(std::io::Error),
    #[error("dial {target}: {source}")]
    Dial {
        target: String,
        #[source]
        source: TransportError,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("config: {0}")]
    Config(String),
}

impl ServerError {
    /// Get the error type string for metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Handshake(HandshakeError::Timeout(_)) => ERROR_TIMEOUT,
            ServerError::Handshake(_) => ERROR_HANDSHAKE,
            ServerError::Cipher(_) => ERROR_CIPHER,
            ServerError::Mux(_) => ERROR_MUX,
            ServerError::Accept(_) => ERROR_ACCEPT,
            ServerError::Dial { .. } => ERROR_DIAL,
            ServerError::Io(_) => ERROR_IO,
            ServerError::Transport(_) => ERROR_TRANSPORT,
            ServerError::Config(_) => ERROR_CONFIG,
        }
    }
}
