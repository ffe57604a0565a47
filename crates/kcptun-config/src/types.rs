//! Configuration type definitions for server, KCP, multiplexer, metrics, and logging.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Transport listen address, e.g. "0.0.0.0:29900".
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Backend address every logical stream is relayed to.
    #[serde(default = "default_target")]
    pub target: String,
    /// Shared secret. Must match the client.
    #[serde(default = "default_key")]
    pub key: String,
    /// Wrap each physical connection in AES-CFB before multiplexing.
    #[serde(default = "default_tuncrypt")]
    pub tuncrypt: bool,
    /// Transport kind: "kcp" or "tcp".
    #[serde(default = "default_transport")]
    pub transport: String,
    /// Deadline for reading the IV from a new connection.
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,
    /// Buffer size for each relay direction (bytes).
    #[serde(default = "default_relay_buffer_size")]
    pub relay_buffer_size: usize,
    /// TCP listener backlog (tcp transport only).
    #[serde(default = "default_connection_backlog")]
    pub connection_backlog: u32,
    /// Backend dial failure policy: "close-session" or "close-stream".
    #[serde(default = "default_dial_failure")]
    pub dial_failure: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            target: default_target(),
            key: default_key(),
            tuncrypt: default_tuncrypt(),
            transport: default_transport(),
            handshake_timeout_secs: default_handshake_timeout_secs(),
            relay_buffer_size: default_relay_buffer_size(),
            connection_backlog: default_connection_backlog(),
            dial_failure: default_dial_failure(),
        }
    }
}

/// KCP tuning applied to every accepted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KcpConfig {
    /// Tuning profile: normal, default, fast, fast2.
    #[serde(default = "default_kcp_mode")]
    pub mode: String,
    /// MTU of UDP packets.
    #[serde(default = "default_kcp_mtu")]
    pub mtu: usize,
    /// Send window (packets).
    #[serde(default = "default_kcp_sndwnd")]
    pub sndwnd: u16,
    /// Receive window (packets).
    #[serde(default = "default_kcp_rcvwnd")]
    pub rcvwnd: u16,
}

impl Default for KcpConfig {
    fn default() -> Self {
        Self {
            mode: default_kcp_mode(),
            mtu: default_kcp_mtu(),
            sndwnd: default_kcp_sndwnd(),
            rcvwnd: default_kcp_rcvwnd(),
        }
    }
}

/// Stream multiplexer settings for server sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuxConfig {
    /// Streams waiting to be accepted before the peer is pushed back.
    #[serde(default = "default_mux_accept_backlog")]
    pub accept_backlog: usize,
    #[serde(default = "default_mux_keepalive")]
    pub keepalive: bool,
    #[serde(default = "default_mux_keepalive_interval_secs")]
    pub keepalive_interval_secs: u64,
    /// Write timeout on the underlying connection.
    #[serde(default = "default_mux_write_timeout_secs")]
    pub write_timeout_secs: u64,
    /// Maximum per-stream receive window (bytes).
    #[serde(default = "default_mux_max_stream_window")]
    pub max_stream_window: u32,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            accept_backlog: default_mux_accept_backlog(),
            keepalive: default_mux_keepalive(),
            keepalive_interval_secs: default_mux_keepalive_interval_secs(),
            write_timeout_secs: default_mux_write_timeout_secs(),
            max_stream_window: default_mux_max_stream_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricsConfig {
    /// Prometheus exporter listen address. Disabled when unset.
    pub listen: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"kcptun_server": "debug", "tokio_kcp": "warn"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
