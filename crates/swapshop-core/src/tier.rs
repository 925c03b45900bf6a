// crates/swapshop-core/src/tier.rs
//
// Score tiers. Star rating and trust level are pure functions of the score
// and share the same thresholds: 820 / 720 / 600 / 450.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SwapshopError;

/// Lowest possible score.
pub const MIN_SCORE: u16 = 300;
/// Highest possible score.
pub const MAX_SCORE: u16 = 900;
/// Score of a freshly created record.
pub const BASE_SCORE: u16 = 650;

const EXCELLENT_FLOOR: u16 = 820;
const GOOD_FLOOR: u16 = 720;
const FAIR_FLOOR: u16 = 600;
const RISKY_FLOOR: u16 = 450;

/// Human-readable trust tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrustLevel {
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Risky,
    Fair,
    Good,
    Excellent,
}

impl TrustLevel {
    pub const ALL: [TrustLevel; 5] = [
        TrustLevel::Excellent,
        TrustLevel::Good,
        TrustLevel::Fair,
        TrustLevel::Risky,
        TrustLevel::VeryPoor,
    ];

    /// Tier for a score.
    pub fn from_score(score: u16) -> Self {
        if score >= EXCELLENT_FLOOR {
            TrustLevel::Excellent
        } else if score >= GOOD_FLOOR {
            TrustLevel::Good
        } else if score >= FAIR_FLOOR {
            TrustLevel::Fair
        } else if score >= RISKY_FLOOR {
            TrustLevel::Risky
        } else {
            TrustLevel::VeryPoor
        }
    }

    /// Inclusive lower and exclusive upper score bound of this tier.
    pub fn score_range(&self) -> (u16, u16) {
        match self {
            TrustLevel::Excellent => (EXCELLENT_FLOOR, MAX_SCORE + 1),
            TrustLevel::Good => (GOOD_FLOOR, EXCELLENT_FLOOR),
            TrustLevel::Fair => (FAIR_FLOOR, GOOD_FLOOR),
            TrustLevel::Risky => (RISKY_FLOOR, FAIR_FLOOR),
            TrustLevel::VeryPoor => (MIN_SCORE, RISKY_FLOOR),
        }
    }

    /// Star count shown next to this tier.
    pub fn stars(&self) -> u8 {
        match self {
            TrustLevel::Excellent => 5,
            TrustLevel::Good => 4,
            TrustLevel::Fair => 3,
            TrustLevel::Risky => 2,
            TrustLevel::VeryPoor => 1,
        }
    }

    /// Filter tag used by admin browsing (`very_poor`, `fair`, ...).
    pub fn slug(&self) -> &'static str {
        match self {
            TrustLevel::Excellent => "excellent",
            TrustLevel::Good => "good",
            TrustLevel::Fair => "fair",
            TrustLevel::Risky => "risky",
            TrustLevel::VeryPoor => "very_poor",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrustLevel::Excellent => "Excellent",
            TrustLevel::Good => "Good",
            TrustLevel::Fair => "Fair",
            TrustLevel::Risky => "Risky",
            TrustLevel::VeryPoor => "Very Poor",
        };
        f.write_str(name)
    }
}

impl FromStr for TrustLevel {
    type Err = SwapshopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        TrustLevel::ALL
            .iter()
            .copied()
            .find(|level| level.slug() == normalized)
            .ok_or_else(|| SwapshopError::Validation(format!("Unknown trust level: {}", s)))
    }
}

/// Star rating (1-5) for a score.
pub fn star_rating(score: u16) -> u8 {
    TrustLevel::from_score(score).stars()
}
