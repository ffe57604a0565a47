//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Address / Secret Defaults
// ============================================================================

/// Default transport listen address.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:29900";
/// Default backend (target) address.
pub const DEFAULT_TARGET: &str = "127.0.0.1:12948";
/// Default shared secret. Must match the client.
pub const DEFAULT_KEY: &str = "it's a secrect";
/// Default transport kind.
pub const DEFAULT_TRANSPORT: &str = "kcp";
/// Tunnel encryption is off unless asked for.
pub const DEFAULT_TUNCRYPT: bool = false;
/// What a failed backend dial does to its session.
pub const DEFAULT_DIAL_FAILURE: &str = "close-session";

// ============================================================================
// KCP Defaults
// ============================================================================

/// Default KCP tuning profile.
pub const DEFAULT_KCP_MODE: &str = "fast";
/// Default MTU of UDP packets.
pub const DEFAULT_KCP_MTU: usize = 1350;
/// Default send window (packets).
pub const DEFAULT_KCP_SNDWND: u16 = 1024;
/// Default receive window (packets).
pub const DEFAULT_KCP_RCVWND: u16 = 1024;
/// Smallest MTU accepted by config validation.
pub const MIN_KCP_MTU: usize = 64;
/// Largest MTU accepted by config validation.
pub const MAX_KCP_MTU: usize = 1500;

// ============================================================================
// Timeout Defaults
// ============================================================================

/// Default deadline for reading the IV from a new physical connection.
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 2;

// ============================================================================
// Buffer/Size Defaults
// ============================================================================

/// Default relay buffer size per direction (32 KiB).
pub const DEFAULT_RELAY_BUFFER_SIZE: usize = 32768;
/// Default TCP listener backlog (tcp transport only).
pub const DEFAULT_CONNECTION_BACKLOG: u32 = 1024;

// ============================================================================
// Multiplexer Defaults
// ============================================================================

/// Streams waiting to be accepted before the mux pushes back.
pub const DEFAULT_MUX_ACCEPT_BACKLOG: usize = 256;
/// Keep-alive probes enabled.
pub const DEFAULT_MUX_KEEPALIVE: bool = true;
/// Keep-alive probe interval in seconds.
pub const DEFAULT_MUX_KEEPALIVE_INTERVAL_SECS: u64 = 30;
/// Write timeout on the underlying connection in seconds.
pub const DEFAULT_MUX_WRITE_TIMEOUT_SECS: u64 = 10;
/// Maximum per-stream flow-control window (16 MiB).
pub const DEFAULT_MUX_MAX_STREAM_WINDOW: u32 = 16 * 1024 * 1024;
/// yamux initial stream window; the maximum may not be smaller.
pub const MIN_MUX_STREAM_WINDOW: u32 = 256 * 1024;

// ============================================================================
// Protocol Constants
// ============================================================================

/// AES block length in bytes.
pub const CIPHER_BLOCK_LEN: usize = 16;
/// IV length sent by the client at the start of every physical connection.
pub const IV_LEN: usize = 2 * CIPHER_BLOCK_LEN;
/// Symmetric key length (SHA-256 output, AES-256).
pub const KEY_LEN: usize = 32;
