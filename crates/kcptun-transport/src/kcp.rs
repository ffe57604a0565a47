//! KCP over UDP transport.
//!
//! Every session accepted by the listener inherits the same tuning: a mode
//! preset (nodelay, update interval, fast resend, congestion control), the
//! MTU and both window sizes.

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::str::FromStr;

use kcptun_core::defaults;
use tokio_kcp::{KcpConfig, KcpListener, KcpNoDelayConfig, KcpStream};
use tracing::debug;

use crate::TransportListener;
use crate::error::TransportError;

/// Named KCP tuning preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KcpMode {
    Normal,
    Default,
    Fast,
    Fast2,
}

impl KcpMode {
    /// nodelay / interval (ms) / fast resend / congestion control off.
    pub fn nodelay(self) -> KcpNoDelayConfig {
        let (nodelay, interval, resend, nc) = match self {
            KcpMode::Normal => (false, 40, 2, true),
            KcpMode::Default => (false, 100, 0, false),
            KcpMode::Fast => (false, 30, 2, true),
            KcpMode::Fast2 => (true, 20, 2, true),
        };
        KcpNoDelayConfig {
            nodelay,
            interval,
            resend,
            nc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KcpMode::Normal => "normal",
            KcpMode::Default => "default",
            KcpMode::Fast => "fast",
            KcpMode::Fast2 => "fast2",
        }
    }
}

impl FromStr for KcpMode {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(KcpMode::Normal),
            "default" => Ok(KcpMode::Default),
            "fast" => Ok(KcpMode::Fast),
            "fast2" => Ok(KcpMode::Fast2),
            other => Err(TransportError::Config(format!(
                "unrecognized mode: {other}"
            ))),
        }
    }
}

impl fmt::Display for KcpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session KCP tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KcpSettings {
    pub mode: KcpMode,
    pub mtu: usize,
    pub sndwnd: u16,
    pub rcvwnd: u16,
}

impl Default for KcpSettings {
    fn default() -> Self {
        Self {
            mode: KcpMode::Fast,
            mtu: defaults::DEFAULT_KCP_MTU,
            sndwnd: defaults::DEFAULT_KCP_SNDWND,
            rcvwnd: defaults::DEFAULT_KCP_RCVWND,
        }
    }
}

impl KcpSettings {
    /// Build the `tokio_kcp` configuration for these settings.
    ///
    /// Stream mode is on: the session carries a byte stream for the
    /// multiplexer, not discrete messages.
    pub fn to_kcp_config(&self) -> KcpConfig {
        let mut config = KcpConfig::default();
        config.mtu = self.mtu;
        config.nodelay = self.mode.nodelay();
        config.wnd_size = (self.sndwnd, self.rcvwnd);
        config.stream = true;
        config
    }
}

/// KCP listener; each remote UDP peer becomes one physical connection.
pub struct KcpTransportListener {
    inner: KcpListener,
}

impl KcpTransportListener {
    pub async fn bind(addr: SocketAddr, settings: &KcpSettings) -> Result<Self, TransportError> {
        let inner = KcpListener::bind(settings.to_kcp_config(), addr)
            .await
            .map_err(|e| TransportError::Kcp(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl TransportListener for KcpTransportListener {
    type Stream = KcpStream;

    fn accept(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(Self::Stream, SocketAddr), TransportError>> + Send + '_>>
    {
        Box::pin(async move {
            let (stream, peer) = self
                .inner
                .accept()
                .await
                .map_err(|e| TransportError::Kcp(e.to_string()))?;
            debug!(peer = %peer, "kcp conversation accepted");
            Ok((stream, peer))
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.inner.local_addr()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn mode_presets() {
        let fast = KcpMode::Fast.nodelay();
        assert!(!fast.nodelay);
        assert_eq!(fast.interval, 30);
        assert_eq!(fast.resend, 2);
        assert!(fast.nc);

        let fast2 = KcpMode::Fast2.nodelay();
        assert!(fast2.nodelay);
        assert_eq!(fast2.interval, 20);

        let normal = KcpMode::Normal.nodelay();
        assert!(!normal.nodelay);
        assert_eq!(normal.interval, 40);

        let default = KcpMode::Default.nodelay();
        assert!(!default.nodelay);
        assert_eq!(default.interval, 100);
        assert_eq!(default.resend, 0);
        assert!(!default.nc);
    }

    #[test]
    fn mode_parse() {
        for mode in [KcpMode::Normal, KcpMode::Default, KcpMode::Fast, KcpMode::Fast2] {
            assert_eq!(mode.as_str().parse::<KcpMode>().unwrap(), mode);
        }
        assert!(matches!(
            "turbo".parse::<KcpMode>(),
            Err(TransportError::Config(_))
        ));
    }

    #[test]
    fn settings_to_config() {
        let settings = KcpSettings {
            mode: KcpMode::Fast2,
            mtu: 1200,
            sndwnd: 512,
            rcvwnd: 256,
        };
        let config = settings.to_kcp_config();
        assert_eq!(config.mtu, 1200);
        assert_eq!(config.wnd_size, (512, 256));
        assert!(config.nodelay.nodelay);
        assert!(config.stream);
    }

    #[tokio::test]
    async fn kcp_loopback_echo() {
        let settings = KcpSettings::default();
        let mut listener = KcpTransportListener::bind("127.0.0.1:0".parse().unwrap(), &settings)
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let config = settings.to_kcp_config();
            let mut stream = KcpStream::connect(&config, addr).await.unwrap();
            stream.write_all(b"ping").await.unwrap();
            let mut buf = [0u8; 4];
            stream.read_exact(&mut buf).await.unwrap();
            buf
        });

        let (mut conn, _peer) = tokio::time::timeout(Duration::from_secs(5), listener.accept())
            .await
            .expect("no kcp session accepted")
            .unwrap();
        let mut buf = [0u8; 4];
        conn.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");
        conn.write_all(b"pong").await.unwrap();
        conn.flush().await.unwrap();

        let reply = tokio::time::timeout(Duration::from_secs(5), client)
            .await
            .expect("client did not receive reply")
            .unwrap();
        assert_eq!(&reply, b"pong");
    }
}
