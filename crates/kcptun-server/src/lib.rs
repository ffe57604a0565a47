//! kcptun server library.
//!
//! This module exposes the server implementation for use by integration tests
//! and potential embedding scenarios.

pub mod cipher;
pub mod cli;
mod error;
pub mod handshake;
pub mod mux;
mod relay;
mod server;
pub mod session;
mod state;

pub use cli::ServerArgs;
pub use error::ServerError;
pub use server::{run_with_shutdown, serve};
pub use state::ServerState;
pub use tokio_util::sync::CancellationToken;
