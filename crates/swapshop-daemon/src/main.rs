// crates/swapshop-daemon/src/main.rs
//
// Binary entrypoint for the SwapShop trust daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, opens the
// RocksDB trust store, and runs the maintenance scheduler (inactivity sweep
// and projection resync) until ctrl-c.

mod config;
mod scheduler;

use std::sync::Arc;

use clap::Parser;
use config::DaemonConfig;
use scheduler::MaintenanceScheduler;

use swapshop_service::TrustScoreService;
use swapshop_store::{RocksProjectionStore, RocksScoreStore};

/// SwapShop trust daemon: periodic trust-score maintenance.
#[derive(Parser, Debug)]
#[command(name = "swapshop-daemon", version = "0.1.0", about = "SwapShop trust-score maintenance daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.swapshop/config.toml")]
    config: String,

    /// Override the data directory from the config file.
    #[arg(long)]
    data_dir: Option<String>,

    /// Run one sweep and resync, then exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found. Tracing is not up yet, so the error is logged below.
    let config_path = expand_tilde(&args.config);
    let (mut daemon_config, load_error) = match DaemonConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (DaemonConfig::default(), Some(e.to_string())),
    };

    // Initialize tracing subscriber for structured logging. RUST_LOG wins
    // over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match load_error {
        None => tracing::info!("Loaded configuration from {}", config_path),
        Some(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    // CLI --data-dir flag overrides the config file value.
    if let Some(dir) = args.data_dir {
        daemon_config.data_dir = dir;
    }

    tracing::info!("SwapShop Trust Daemon v0.1.0");
    tracing::info!("Data directory: {}", daemon_config.data_dir);
    tracing::info!(
        "Sweep interval: {}s, resync interval: {}s",
        daemon_config.sweep_interval_secs,
        daemon_config.resync_interval_secs
    );

    let data_dir = expand_tilde(&daemon_config.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let rocksdb_path = format!("{}/rocksdb", data_dir);
    let store = Arc::new(
        RocksScoreStore::open(&rocksdb_path)
            .map_err(|e| format!("Failed to open RocksDB: {}", e))?,
    );
    tracing::info!("Trust store opened at {}", rocksdb_path);

    let projection = Arc::new(RocksProjectionStore::new(store.clone()));
    let service = Arc::new(TrustScoreService::new(
        store,
        projection,
        daemon_config.trust.clone(),
    ));

    let scheduler = MaintenanceScheduler::new(
        service,
        daemon_config.sweep_interval_secs,
        daemon_config.resync_interval_secs,
    );

    if args.once {
        scheduler.run_job(scheduler::Job::InactivitySweep).await;
        scheduler.run_job(scheduler::Job::ProjectionResync).await;
    } else {
        scheduler.run().await?;
    }

    tracing::info!("SwapShop daemon shut down gracefully");
    Ok(())
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
