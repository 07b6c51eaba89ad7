// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Lizmap server info API
//
//  Host:    plugin metadata from disk, host manifest (YAML)
//  API:     axum on tokio, OGC-API style handlers below a prefix
//  Config:  YAML + LIZMAP_ env overrides
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use clap::Parser;
use lizmap_api::{ApiState, start_api};
use lizmap_core::{EnvSource, LizmapConfig, ProcessEnv};
use lizmap_host::Host;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "lizmap-server", version, about = "Lizmap server information API")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/lizmap/lizmap.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Lizmap server info API starting");

    // ── Config ──
    let config = if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
        LizmapConfig::load(&cli.config)?
    } else {
        info!("No config file found, using defaults");
        LizmapConfig::default()
    };

    // ── Host ──
    let host = Arc::new(Host::from_config(&config.host)?);
    info!(
        backend = %host.backend.kind(),
        plugins = host.backend.list_plugins().len(),
        "Host ready"
    );

    // ── API ──
    let env: Arc<dyn EnvSource> = Arc::new(ProcessEnv);
    let state = ApiState::new(host, env, &config);
    let prefix = config.api_prefix();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(start_api(config.api.clone(), prefix, state, shutdown_signal()))?;

    info!("Lizmap server info API stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix (docker stop).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
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
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, stopping...");
}
