// crates/swapshop-daemon/src/config.rs
//
// Runtime configuration for the SwapShop trust daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use swapshop_service::ServiceConfig;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data storage (RocksDB).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between inactivity sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Seconds between full projection resyncs. 0 disables them.
    #[serde(default = "default_resync_interval_secs")]
    pub resync_interval_secs: u64,

    /// Trust-score policy (`[trust]` table).
    #[serde(default)]
    pub trust: ServiceConfig,
}

fn default_data_dir() -> String {
    "~/.swapshop/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    86_400
}

fn default_resync_interval_secs() -> u64 {
    21_600
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            sweep_interval_secs: default_sweep_interval_secs(),
            resync_interval_secs: default_resync_interval_secs(),
            trust: ServiceConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
