//! CLI module for kcptun-server.
//!
//! Every setting has a default, so the server runs from flags alone; a
//! config file (json/jsonc/yaml/toml) is layered under the flags when given.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use kcptun_config::{
    CliOverrides, Config, LoggingConfig, apply_overrides, load_config, validate_config,
};
use kcptun_core::VERSION;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{CancellationToken, run_with_shutdown};

/// kcptun server CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "kcptun-server", version, about = "kcptun server in Rust")]
pub struct ServerArgs {
    /// Config file path (json/jsonc/yaml/toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

/// Build the effective configuration: file (or defaults), then flags.
pub fn resolve_config(args: &ServerArgs) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args.overrides);
    validate_config(&config)?;
    Ok(config)
}

/// Run the kcptun server with the given arguments.
pub async fn run(args: ServerArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&args)?;

    init_tracing(&config.logging);
    info!(version = VERSION, "starting kcptun-server");

    if let Some(listen) = &config.metrics.listen {
        match kcptun_metrics::init_prometheus(listen) {
            Ok(()) => info!("metrics exporter listening on {}", listen),
            Err(e) => warn!("failed to start metrics exporter: {}", e),
        }
    }

    // Stop accepting on SIGTERM/SIGINT
    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal_handler().await;
        info!("shutdown signal received");
        shutdown_signal.cancel();
    });

    run_with_shutdown(config, shutdown).await?;
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            // Fall back to waiting forever
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                // Fall back to waiting forever
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Initialize tracing subscriber with the given logging configuration.
///
/// `level` plus per-module `filters` build the env filter; `format` is
/// json, compact or pretty (default) and `output` is stdout or stderr
/// (default).
fn init_tracing(config: &LoggingConfig) {
    let mut directives = vec![config.level.as_deref().unwrap_or("info").to_string()];
    directives.extend(
        config
            .filters
            .iter()
            .map(|(module, level)| format!("{module}={level}")),
    );
    let filter =
        EnvFilter::try_new(directives.join(",")).unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = match config.output.as_deref() {
        Some("stdout") => BoxMakeWriter::new(io::stdout),
        _ => BoxMakeWriter::new(io::stderr),
    };
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format.as_deref() {
        Some("json") => fmt::layer().json().with_writer(writer).boxed(),
        Some("compact") => fmt::layer().compact().with_writer(writer).boxed(),
        _ => fmt::layer().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
}
