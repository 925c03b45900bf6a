// crates/swapshop-reputation/src/eligibility.rs
//
// Transaction eligibility gating.
//
//   score < 450                          -> ineligible (hard block)
//   450 <= score < 500 and borrowing     -> warning
//   >= 2 of the 3 newest events negative -> warning
//   months_inactive >= 12                -> warning
//
// Only the hard block flips `eligible`. Warnings accumulate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use swapshop_core::decay::is_inactive;
use swapshop_core::scoring::RECENT_WINDOW;
use swapshop_core::{ScoreRecord, SwapshopError, TrustLevel};

/// Scores below this are blocked from all transactions.
pub const HARD_BLOCK_BELOW: u16 = 450;

/// Borrowers below this score get a low-trust warning.
pub const BORROW_WARNING_BELOW: u16 = 500;

/// Negative events within the recent window that trigger a warning.
pub const RECENT_NEGATIVE_WARNING: usize = 2;

pub const RESTRICTION_SCORE_TOO_LOW: &str = "Trust score too low for transactions";
pub const WARNING_LOW_SCORE_BORROW: &str = "Low trust score - lenders may be cautious";
pub const WARNING_RECENT_NEGATIVE: &str = "Recent negative activity detected";
pub const WARNING_INACTIVE: &str = "Account has been inactive for over 12 months";

/// Which side of a transaction the user wants to take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionIntent {
    #[default]
    Borrow,
    Lend,
}

impl fmt::Display for TransactionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionIntent::Borrow => write!(f, "borrow"),
            TransactionIntent::Lend => write!(f, "lend"),
        }
    }
}

impl FromStr for TransactionIntent {
    type Err = SwapshopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "borrow" => Ok(TransactionIntent::Borrow),
            "lend" => Ok(TransactionIntent::Lend),
            other => Err(SwapshopError::Validation(format!(
                "Unknown transaction kind: {}",
                other
            ))),
        }
    }
}

/// Result of an eligibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub trust_score: u16,
    pub star_rating: u8,
    pub trust_level: TrustLevel,
    pub warnings: Vec<String>,
    pub restrictions: Vec<String>,
}

/// Evaluate whether the record's owner may take part in a transaction.
pub fn evaluate(record: &ScoreRecord, intent: TransactionIntent) -> Eligibility {
    let score = record.current_score();
    let mut result = Eligibility {
        eligible: true,
        trust_score: score,
        star_rating: record.star_rating(),
        trust_level: record.trust_level(),
        warnings: Vec::new(),
        restrictions: Vec::new(),
    };

    if score < HARD_BLOCK_BELOW {
        result.eligible = false;
        result.restrictions.push(RESTRICTION_SCORE_TOO_LOW.to_string());
    } else if score < BORROW_WARNING_BELOW && intent == TransactionIntent::Borrow {
        result.warnings.push(WARNING_LOW_SCORE_BORROW.to_string());
    }

    let recent_negative = record
        .recent_events(RECENT_WINDOW)
        .iter()
        .filter(|e| e.impact < 0)
        .count();
    if recent_negative >= RECENT_NEGATIVE_WARNING {
        result.warnings.push(WARNING_RECENT_NEGATIVE.to_string());
    }

    if is_inactive(record.months_inactive) {
        result.warnings.push(WARNING_INACTIVE.to_string());
    }

    result
}
