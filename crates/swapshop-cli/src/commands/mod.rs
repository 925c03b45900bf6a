// crates/swapshop-cli/src/commands/mod.rs
//
// Command module declarations for the SwapShop CLI, plus the shared context
// every command runs against: a TrustScoreService over the local RocksDB
// data directory.

pub mod admin;
pub mod browse;
pub mod eligibility;
pub mod event;
pub mod leaderboard;
pub mod maintenance;
pub mod stats;
pub mod summary;

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use swapshop_core::{TrustEvent, UserId};
use swapshop_service::{ServiceConfig, TrustScoreService};
use swapshop_store::{RocksProjectionStore, RocksScoreStore};

use crate::output::{truncate, OutputFormat};

/// The parts of the daemon config file the CLI reads.
#[derive(Debug, Default, Deserialize)]
struct CliConfig {
    #[serde(default)]
    data_dir: Option<String>,
    #[serde(default)]
    trust: ServiceConfig,
}

/// Shared state handed to every command.
pub struct Context {
    pub service: Arc<TrustScoreService>,
    pub format: OutputFormat,
}

impl Context {
    /// Open the trust store. `--data-dir` wins over the config file's
    /// `data_dir`; a missing config file means defaults.
    pub fn open(
        data_dir: Option<&str>,
        config_path: &str,
        format: OutputFormat,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match std::fs::read_to_string(expand_tilde(config_path)) {
            Ok(contents) => toml::from_str::<CliConfig>(&contents)?,
            Err(_) => CliConfig::default(),
        };

        let data_dir = data_dir
            .map(str::to_string)
            .or(config.data_dir)
            .unwrap_or_else(|| "~/.swapshop/data".to_string());
        let data_dir = expand_tilde(&data_dir);
        std::fs::create_dir_all(&data_dir)?;

        let store = Arc::new(RocksScoreStore::open(&format!("{}/rocksdb", data_dir))?);
        let projection = Arc::new(RocksProjectionStore::new(store.clone()));
        let service = TrustScoreService::new(store, projection, config.trust);

        Ok(Self {
            service: Arc::new(service),
            format,
        })
    }
}

/// Parse a user id argument.
pub fn parse_user(raw: &str) -> Result<UserId, Box<dyn std::error::Error>> {
    Uuid::parse_str(raw.trim()).map_err(|e| format!("Invalid user id '{}': {}", raw, e).into())
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}

/// A ledger entry as a table row.
#[derive(tabled::Tabled)]
pub struct EventRow {
    #[tabled(rename = "When")]
    pub when: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Impact")]
    pub impact: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Admin Notes")]
    pub admin_notes: String,
}

impl From<&TrustEvent> for EventRow {
    fn from(e: &TrustEvent) -> Self {
        Self {
            when: e.occurred_at.format("%Y-%m-%d %H:%M").to_string(),
            kind: e.kind.to_string(),
            impact: format!("{:+}", e.impact),
            description: truncate(&e.description, 60),
            admin_notes: e
                .admin_notes
                .as_deref()
                .map(|n| truncate(n, 40))
                .unwrap_or_default(),
        }
    }
}

/// Render stars as a fixed-width string, e.g. `★★★☆☆`.
pub fn stars(n: u8) -> String {
    let filled = n.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
