// crates/swapshop-store/src/retry.rs
//
// Bounded retry policy for optimistic read-modify-write cycles.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

fn default_max_attempts() -> u32 {
    5
}

fn default_base_backoff_ms() -> u64 {
    10
}

fn default_max_backoff_ms() -> u64 {
    200
}

/// How many times a conflicting update is retried and how long to wait
/// between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 behave as 1.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never waits. Used by tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before retrying after the `attempt`-th failure (1-based).
    ///
    /// Exponential in the attempt number, capped at `max_backoff_ms`, with up
    /// to 50% random jitter added so colliding writers spread out.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if self.base_backoff_ms == 0 || self.max_backoff_ms == 0 {
            return Duration::ZERO;
        }
        let shift = attempt.saturating_sub(1).min(16);
        let exp = self.base_backoff_ms.saturating_mul(1u64 << shift);
        let capped = exp.min(self.max_backoff_ms);
        let jitter = rand::thread_rng().gen_range(0..=capped / 2);
        Duration::from_millis((capped + jitter).min(self.max_backoff_ms))
    }
}
