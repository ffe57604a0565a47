//! Server state shared across connections.

use std::time::Duration;

use kcptun_config::Config;

use crate::cipher::CipherKey;
use crate::error::ServerError;
use crate::mux::MuxSettings;
use crate::session::DialFailurePolicy;

/// Shared server state for all physical connections.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub key: CipherKey,
    pub tuncrypt: bool,
    pub target: String,
    pub handshake_timeout: Duration,
    pub mux: MuxSettings,
    pub dial_failure: DialFailurePolicy,
    pub relay_buffer_size: usize,
}

impl ServerState {
    pub fn from_config(config: &Config) -> Result<Self, ServerError> {
        let dial_failure = config
            .server
            .dial_failure
            .parse()
            .map_err(ServerError::Config)?;
        let mux = MuxSettings::from_config(&config.mux);
        mux.validate()?;
        Ok(Self {
            key: CipherKey::derive(&config.server.key),
            tuncrypt: config.server.tuncrypt,
            target: config.server.target.clone(),
            handshake_timeout: Duration::from_secs(config.server.handshake_timeout_secs),
            mux,
            dial_failure,
            relay_buffer_size: config.server.relay_buffer_size,
        })
    }
}
