//! Core types and constants shared across kcptun crates.
//!
//! This crate provides:
//! - Default configuration values and wire constants
//! - Error type labels for metrics/logging
//! - The relay primitive that splices a logical stream to a backend

pub mod defaults;
pub mod errors;
pub mod io;

// Re-export commonly used items at crate root
pub use defaults::*;
pub use errors::*;

/// Project name.
pub const PROJECT_NAME: &str = "kcptun-rs";
/// Project version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
