// crates/swapshop-core/src/scoring.rs
//
// ScoringEngine: derives (score, stars, level) from an event ledger.
//
//   weighted = sum(recent.impact * 2) + sum(older.impact * 1)
//   raw      = 650 + weighted / 5   (- 20 if inactive >= 12 months)
//   score    = clamp(300, 900, round(raw))
//
// "Recent" is the three chronologically newest events. The sort is stable,
// so events with equal timestamps keep their ledger order.
// The whole ledger is refolded on every call; no incremental state.

use serde::{Deserialize, Serialize};

use crate::decay::{is_inactive, INACTIVITY_PENALTY};
use crate::event::TrustEvent;
use crate::tier::{star_rating, TrustLevel, BASE_SCORE, MAX_SCORE, MIN_SCORE};

/// Number of newest events that receive the recent weight.
pub const RECENT_WINDOW: usize = 3;
/// Weight applied to events inside the recent window.
pub const RECENT_WEIGHT: i64 = 2;
/// Weight applied to all older events.
pub const OLDER_WEIGHT: i64 = 1;
/// Divisor applied to the weighted impact sum.
pub const NORMALIZATION_FACTOR: f64 = 5.0;

/// Output of a recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub score: u16,
    pub star_rating: u8,
    pub trust_level: TrustLevel,
}

impl ScoreOutcome {
    /// Outcome for a given score (tiers derived).
    pub fn from_score(score: u16) -> Self {
        Self {
            score,
            star_rating: star_rating(score),
            trust_level: TrustLevel::from_score(score),
        }
    }
}

/// Ledger indices ordered newest first. Equal timestamps keep ledger order.
pub fn newest_first(events: &[TrustEvent]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..events.len()).collect();
    order.sort_by(|&a, &b| events[b].occurred_at.cmp(&events[a].occurred_at));
    order
}

/// Recency-weighted impact sum over the ledger.
pub fn weighted_impact(events: &[TrustEvent]) -> i64 {
    newest_first(events)
        .into_iter()
        .enumerate()
        .map(|(rank, idx)| {
            let weight = if rank < RECENT_WINDOW {
                RECENT_WEIGHT
            } else {
                OLDER_WEIGHT
            };
            events[idx].impact as i64 * weight
        })
        .sum()
}

/// Recalculate score, stars, and level from the ledger and inactivity counter.
///
/// Pure: the same `(events, months_inactive)` always yields the same outcome.
pub fn recalculate(events: &[TrustEvent], months_inactive: u32) -> ScoreOutcome {
    let weighted = weighted_impact(events);
    let mut raw = BASE_SCORE as f64 + weighted as f64 / NORMALIZATION_FACTOR;

    if is_inactive(months_inactive) {
        raw -= INACTIVITY_PENALTY as f64;
    }

    let clamped = raw.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64);
    ScoreOutcome::from_score(clamped as u16)
}
