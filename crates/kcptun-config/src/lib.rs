//! Configuration loading and CLI definitions.
//!
//! Every field has a default, so a server can run from command-line flags
//! alone; a config file (toml, json/jsonc, yaml) is optional.

mod cli;
mod defaults;
mod loader;
mod types;
mod validate;

use serde::{Deserialize, Serialize};

pub use cli::{CliOverrides, apply_overrides};
pub use loader::{ConfigError, load_config};
pub use types::*;
pub use validate::{parse_listen_addr, validate_config};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub kcp: KcpConfig,
    #[serde(default)]
    pub mux: MuxConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_config_is_valid() {
        validate_config(&Config::default()).unwrap();
    }

    #[test]
    fn listen_accepts_bare_port() {
        assert_eq!(
            parse_listen_addr(":29900").unwrap(),
            "0.0.0.0:29900".parse::<std::net::SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_listen_addr("[::1]:4000").unwrap(),
            "[::1]:4000".parse::<std::net::SocketAddr>().unwrap()
        );
        assert!(parse_listen_addr(":").is_err());
        assert!(parse_listen_addr(":http").is_err());

        let args = CliOverrides::parse_from(["test", "-l", ":29900"]);
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, &args);
        validate_config(&cfg).unwrap();
    }

    #[test]
    fn load_toml() {
        let file = write_config(
            ".toml",
            r#"
[server]
listen = "127.0.0.1:4000"
target = "127.0.0.1:8080"
tuncrypt = true

[kcp]
mode = "fast2"

[mux]
accept_backlog = 64
"#,
        );
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.server.listen, "127.0.0.1:4000");
        assert_eq!(cfg.server.target, "127.0.0.1:8080");
        assert!(cfg.server.tuncrypt);
        assert_eq!(cfg.kcp.mode, "fast2");
        assert_eq!(cfg.kcp.mtu, 1350);
        assert_eq!(cfg.mux.accept_backlog, 64);
        assert_eq!(cfg.mux.keepalive_interval_secs, 30);
        validate_config(&cfg).unwrap();
    }

    #[test]
    fn load_jsonc_with_comments() {
        let file = write_config(
            ".jsonc",
            r#"{
  // backend
  "server": { "target": "10.0.0.1:22", "dial_failure": "close-stream" },
  /* metrics */
  "metrics": { "listen": "127.0.0.1:9100" }
}"#,
        );
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.server.target, "10.0.0.1:22");
        assert_eq!(cfg.server.dial_failure, "close-stream");
        assert_eq!(cfg.server.listen, "0.0.0.0:29900");
        assert_eq!(cfg.metrics.listen.as_deref(), Some("127.0.0.1:9100"));
    }

    #[test]
    fn load_yaml() {
        let file = write_config(
            ".yaml",
            "server:\n  transport: tcp\nlogging:\n  level: debug\n",
        );
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.server.transport, "tcp");
        assert_eq!(cfg.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn load_unknown_extension() {
        let file = write_config(".ini", "listen=1");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::UnsupportedFormat)
        ));
    }

    #[test]
    fn overrides_take_precedence() {
        let mut cfg = Config::default();
        let overrides = CliOverrides::parse_from([
            "kcptun",
            "-l",
            "127.0.0.1:5000",
            "-t",
            "127.0.0.1:6000",
            "--key",
            "secret",
            "--mode",
            "normal",
            "--tuncrypt",
            "--mtu",
            "1400",
            "--sndwnd",
            "512",
            "--rcvwnd",
            "256",
            "--dial-failure",
            "close-stream",
        ]);
        apply_overrides(&mut cfg, &overrides);
        assert_eq!(cfg.server.listen, "127.0.0.1:5000");
        assert_eq!(cfg.server.target, "127.0.0.1:6000");
        assert_eq!(cfg.server.key, "secret");
        assert!(cfg.server.tuncrypt);
        assert_eq!(cfg.kcp.mode, "normal");
        assert_eq!(cfg.kcp.mtu, 1400);
        assert_eq!(cfg.kcp.sndwnd, 512);
        assert_eq!(cfg.kcp.rcvwnd, 256);
        assert_eq!(cfg.server.dial_failure, "close-stream");
        validate_config(&cfg).unwrap();
    }

    #[test]
    fn tuncrypt_accepts_explicit_false() {
        let mut cfg = Config::default();
        cfg.server.tuncrypt = true;
        let overrides = CliOverrides::parse_from(["kcptun", "--tuncrypt", "false"]);
        apply_overrides(&mut cfg, &overrides);
        assert!(!cfg.server.tuncrypt);
    }

    #[test]
    fn validate_rejects_unknown_mode() {
        let mut cfg = Config::default();
        cfg.kcp.mode = "turbo".into();
        let err = validate_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("kcp.mode"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cases: &[fn(&mut Config)] = &[
            |c| c.server.listen = String::new(),
            |c| c.server.listen = "not-an-address".into(),
            |c| c.server.target = " ".into(),
            |c| {
                c.server.tuncrypt = true;
                c.server.key = String::new();
            },
            |c| c.server.transport = "quic".into(),
            |c| c.server.dial_failure = "retry".into(),
            |c| c.server.handshake_timeout_secs = 0,
            |c| c.server.relay_buffer_size = 16,
            |c| c.kcp.mtu = 9000,
            |c| c.kcp.sndwnd = 0,
            |c| c.mux.accept_backlog = 0,
            |c| c.mux.write_timeout_secs = 0,
            |c| c.mux.max_stream_window = 1024,
            |c| c.metrics.listen = Some("nowhere".into()),
        ];
        for (i, mutate) in cases.iter().enumerate() {
            let mut cfg = Config::default();
            mutate(&mut cfg);
            assert!(
                matches!(validate_config(&cfg), Err(ConfigError::Validation(_))),
                "case {i} should fail validation"
            );
        }
    }
}
