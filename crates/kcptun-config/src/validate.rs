//! Configuration validation logic.

use std::net::{AddrParseError, SocketAddr};

use crate::Config;
use crate::defaults::{max_kcp_mtu, min_kcp_mtu, min_mux_stream_window};
use crate::loader::ConfigError;

const VALID_TRANSPORTS: [&str; 2] = ["kcp", "tcp"];
const VALID_MODES: [&str; 4] = ["normal", "default", "fast", "fast2"];
const VALID_DIAL_FAILURE: [&str; 2] = ["close-session", "close-stream"];

/// Parse a listen address. A bare `:port` binds every IPv4 interface.
pub fn parse_listen_addr(listen: &str) -> Result<SocketAddr, AddrParseError> {
    match listen.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}").parse(),
        None => listen.parse(),
    }
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.listen.trim().is_empty() {
        return Err(ConfigError::Validation("server.listen is empty".into()));
    }
    if parse_listen_addr(&config.server.listen).is_err() {
        return Err(ConfigError::Validation(format!(
            "server.listen is not a socket address: {}",
            config.server.listen
        )));
    }
    if config.server.target.trim().is_empty() {
        return Err(ConfigError::Validation("server.target is empty".into()));
    }
    if config.server.tuncrypt && config.server.key.is_empty() {
        return Err(ConfigError::Validation(
            "server.key is required when tuncrypt is enabled".into(),
        ));
    }
    if !VALID_TRANSPORTS.contains(&config.server.transport.as_str()) {
        return Err(ConfigError::Validation(format!(
            "server.transport must be one of: {:?}",
            VALID_TRANSPORTS
        )));
    }
    if !VALID_DIAL_FAILURE.contains(&config.server.dial_failure.as_str()) {
        return Err(ConfigError::Validation(format!(
            "server.dial_failure must be one of: {:?}",
            VALID_DIAL_FAILURE
        )));
    }
    if config.server.handshake_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "server.handshake_timeout_secs must be > 0".into(),
        ));
    }
    if config.server.relay_buffer_size < 1024 {
        return Err(ConfigError::Validation(
            "server.relay_buffer_size must be >= 1024".into(),
        ));
    }
    if config.server.relay_buffer_size > 1024 * 1024 {
        return Err(ConfigError::Validation(
            "server.relay_buffer_size must be <= 1MB".into(),
        ));
    }
    if config.server.connection_backlog == 0 {
        return Err(ConfigError::Validation(
            "server.connection_backlog must be > 0".into(),
        ));
    }
    // KCP tuning
    if !VALID_MODES.contains(&config.kcp.mode.as_str()) {
        return Err(ConfigError::Validation(format!(
            "unrecognized kcp.mode '{}', expected one of: {:?}",
            config.kcp.mode, VALID_MODES
        )));
    }
    if config.kcp.mtu < min_kcp_mtu() || config.kcp.mtu > max_kcp_mtu() {
        return Err(ConfigError::Validation(format!(
            "kcp.mtu must be {}..={}",
            min_kcp_mtu(),
            max_kcp_mtu()
        )));
    }
    if config.kcp.sndwnd == 0 || config.kcp.rcvwnd == 0 {
        return Err(ConfigError::Validation(
            "kcp.sndwnd and kcp.rcvwnd must be > 0".into(),
        ));
    }
    // Multiplexer
    if config.mux.accept_backlog == 0 {
        return Err(ConfigError::Validation(
            "mux.accept_backlog must be > 0".into(),
        ));
    }
    if config.mux.keepalive && config.mux.keepalive_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "mux.keepalive_interval_secs must be > 0".into(),
        ));
    }
    if config.mux.write_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "mux.write_timeout_secs must be > 0".into(),
        ));
    }
    if config.mux.max_stream_window < min_mux_stream_window() {
        return Err(ConfigError::Validation(format!(
            "mux.max_stream_window too small (min {})",
            min_mux_stream_window()
        )));
    }
    if let Some(listen) = &config.metrics.listen
        && listen.parse::<SocketAddr>().is_err()
    {
        return Err(ConfigError::Validation(format!(
            "metrics.listen is not a socket address: {listen}"
        )));
    }
    Ok(())
}
