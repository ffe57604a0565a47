//! CLI override definitions and application logic.

use clap::Parser;

use crate::Config;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override transport listen address, e.g. 0.0.0.0:29900 or :29900
    #[arg(short = 'l', long)]
    pub listen: Option<String>,
    /// Override target server address, e.g. 127.0.0.1:12948
    #[arg(short = 't', long)]
    pub target: Option<String>,
    /// Shared secret, must be the same as the client's
    #[arg(long, env = "KCPTUN_KEY", hide_env_values = true)]
    pub key: Option<String>,
    /// Communication mode: fast2, fast, normal, default
    #[arg(long)]
    pub mode: Option<String>,
    /// Enable tunnel encryption (AES-CFB over the physical connection)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub tuncrypt: Option<bool>,
    /// MTU of UDP packets; use tracepath to discover the path MTU
    #[arg(long)]
    pub mtu: Option<usize>,
    /// Send window size (packets)
    #[arg(long)]
    pub sndwnd: Option<u16>,
    /// Receive window size (packets)
    #[arg(long)]
    pub rcvwnd: Option<u16>,
    /// Transport kind: kcp | tcp
    #[arg(long)]
    pub transport: Option<String>,
    /// IV handshake deadline (seconds)
    #[arg(long)]
    pub handshake_timeout_secs: Option<u64>,
    /// Buffer size for each relay direction (bytes)
    #[arg(long)]
    pub relay_buffer_size: Option<usize>,
    /// Backend dial failure policy: close-session | close-stream
    #[arg(long)]
    pub dial_failure: Option<String>,
    /// Override metrics listen address
    #[arg(long)]
    pub metrics_listen: Option<String>,
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.listen {
        config.server.listen = v.clone();
    }
    if let Some(v) = &overrides.target {
        config.server.target = v.clone();
    }
    if let Some(v) = &overrides.key {
        config.server.key = v.clone();
    }
    if let Some(v) = overrides.tuncrypt {
        config.server.tuncrypt = v;
    }
    if let Some(v) = &overrides.transport {
        config.server.transport = v.clone();
    }
    if let Some(v) = overrides.handshake_timeout_secs {
        config.server.handshake_timeout_secs = v;
    }
    if let Some(v) = overrides.relay_buffer_size {
        config.server.relay_buffer_size = v;
    }
    if let Some(v) = &overrides.dial_failure {
        config.server.dial_failure = v.clone();
    }
    // KCP tuning
    if let Some(v) = &overrides.mode {
        config.kcp.mode = v.clone();
    }
    if let Some(v) = overrides.mtu {
        config.kcp.mtu = v;
    }
    if let Some(v) = overrides.sndwnd {
        config.kcp.sndwnd = v;
    }
    if let Some(v) = overrides.rcvwnd {
        config.kcp.rcvwnd = v;
    }
    if let Some(v) = &overrides.metrics_listen {
        config.metrics.listen = Some(v.clone());
    }
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
}
