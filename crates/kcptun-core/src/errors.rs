//! Error type constants for metrics and logging.
//!
//! These constants provide consistent error classification across all crates.

/// IV handshake failed (short read, timeout).
pub const ERROR_HANDSHAKE: &str = "handshake";
/// Cipher construction failed.
pub const ERROR_CIPHER: &str = "cipher";
/// Multiplexer construction failed.
pub const ERROR_MUX: &str = "mux";
/// Multiplexer accept failed; the session is gone.
pub const ERROR_ACCEPT: &str = "accept";
/// Backend dial failed.
pub const ERROR_DIAL: &str = "dial";
/// Transport listener error.
pub const ERROR_TRANSPORT: &str = "transport";
/// I/O error.
pub const ERROR_IO: &str = "io";
/// Timeout error.
pub const ERROR_TIMEOUT: &str = "timeout";
/// Configuration error.
pub const ERROR_CONFIG: &str = "config";
