// crates/swapshop-service/src/config.rs
//
// Trust-score service configuration: admin policy caps, retry behaviour,
// and listing limits. Embedded as the `[trust]` table of the daemon config.

use serde::{Deserialize, Serialize};

use swapshop_store::RetryPolicy;

/// Runtime policy for `TrustScoreService`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Largest absolute impact an admin may apply in one action.
    #[serde(default = "default_max_adjustment")]
    pub max_adjustment: i32,

    /// Impact of an admin penalty when no custom value is supplied.
    #[serde(default = "default_penalty")]
    pub default_penalty: i32,

    /// Retry policy for conflicting record updates.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Leaderboard size when the caller gives none (or zero).
    #[serde(default = "default_leaderboard_default")]
    pub leaderboard_default: usize,

    /// Upper bound on leaderboard size.
    #[serde(default = "default_leaderboard_max")]
    pub leaderboard_max: usize,

    /// Admin browse page size when the caller gives none (or zero).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_max_adjustment() -> i32 {
    200
}

fn default_penalty() -> i32 {
    -70
}

fn default_leaderboard_default() -> usize {
    10
}

fn default_leaderboard_max() -> usize {
    100
}

fn default_page_size() -> usize {
    20
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_adjustment: default_max_adjustment(),
            default_penalty: default_penalty(),
            retry: RetryPolicy::default(),
            leaderboard_default: default_leaderboard_default(),
            leaderboard_max: default_leaderboard_max(),
            page_size: default_page_size(),
        }
    }
}

impl ServiceConfig {
    /// Effective leaderboard size for a requested limit.
    pub fn leaderboard_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if n > 0 => n.min(self.leaderboard_max),
            _ => self.leaderboard_default.min(self.leaderboard_max),
        }
    }

    /// Effective browse page size for a requested limit.
    pub fn page_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if n > 0 => n.min(self.leaderboard_max),
            _ => self.page_size,
        }
    }
}
