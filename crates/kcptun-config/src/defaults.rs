//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `kcptun_core::defaults`.

use kcptun_core::defaults;

/// Generate default value functions that forward to kcptun_core::defaults constants.
macro_rules! default_fns {
    // For Copy types (integers, bool, etc.)
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

default_fns! {
    default_tuncrypt                  => DEFAULT_TUNCRYPT: bool,
    default_handshake_timeout_secs    => DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64,
    default_relay_buffer_size         => DEFAULT_RELAY_BUFFER_SIZE: usize,
    default_connection_backlog        => DEFAULT_CONNECTION_BACKLOG: u32,
    default_kcp_mtu                   => DEFAULT_KCP_MTU: usize,
    default_kcp_sndwnd                => DEFAULT_KCP_SNDWND: u16,
    default_kcp_rcvwnd                => DEFAULT_KCP_RCVWND: u16,
    min_kcp_mtu                       => MIN_KCP_MTU: usize,
    max_kcp_mtu                       => MAX_KCP_MTU: usize,
    default_mux_accept_backlog        => DEFAULT_MUX_ACCEPT_BACKLOG: usize,
    default_mux_keepalive             => DEFAULT_MUX_KEEPALIVE: bool,
    default_mux_keepalive_interval_secs => DEFAULT_MUX_KEEPALIVE_INTERVAL_SECS: u64,
    default_mux_write_timeout_secs    => DEFAULT_MUX_WRITE_TIMEOUT_SECS: u64,
    default_mux_max_stream_window     => DEFAULT_MUX_MAX_STREAM_WINDOW: u32,
    min_mux_stream_window             => MIN_MUX_STREAM_WINDOW: u32,
}

default_string_fns! {
    default_listen       => DEFAULT_LISTEN,
    default_target       => DEFAULT_TARGET,
    default_key          => DEFAULT_KEY,
    default_transport    => DEFAULT_TRANSPORT,
    default_dial_failure => DEFAULT_DIAL_FAILURE,
    default_kcp_mode     => DEFAULT_KCP_MODE,
}
