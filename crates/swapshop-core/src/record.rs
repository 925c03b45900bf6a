// crates/swapshop-core/src/record.rs
//
// ScoreRecord: the authoritative per-user reputation aggregate.
//
// The ledger is append-only. `current_score` and `star_rating` are never
// assigned directly; every mutation ends with a full recalculation over the
// ledger. `version` is owned by the store and used for optimistic
// concurrency on save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decay::{months_between, INACTIVITY_THRESHOLD_MONTHS};
use crate::event::{AppliedEvent, EventKind, EventRefs, TrustEvent};
use crate::identity::UserId;
use crate::scoring::{newest_first, recalculate, ScoreOutcome};
use crate::summary::{DetailedSummary, ProjectionUpdate, PublicSummary, Summary};
use crate::tier::{star_rating, TrustLevel, BASE_SCORE};

/// Number of recent events included in a summary.
pub const SUMMARY_EVENT_LIMIT: usize = 5;

/// Per-user reputation state: event ledger plus derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub user_id: UserId,
    current_score: u16,
    star_rating: u8,
    events: Vec<TrustEvent>,
    pub last_activity_at: DateTime<Utc>,
    /// True until the first positive-impact event; gates the one-time bonus.
    pub is_first_transaction: bool,
    pub months_inactive: u32,
    pub total_transactions: u64,
    pub positive_transactions: u64,
    pub negative_transactions: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Storage version for optimistic concurrency. 0 = never persisted.
    #[serde(default)]
    pub version: u64,
}

impl ScoreRecord {
    /// Fresh record at the base score with an empty ledger.
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            current_score: BASE_SCORE,
            star_rating: star_rating(BASE_SCORE),
            events: Vec::new(),
            last_activity_at: now,
            is_first_transaction: true,
            months_inactive: 0,
            total_transactions: 0,
            positive_transactions: 0,
            negative_transactions: 0,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn current_score(&self) -> u16 {
        self.current_score
    }

    pub fn star_rating(&self) -> u8 {
        self.star_rating
    }

    pub fn trust_level(&self) -> TrustLevel {
        TrustLevel::from_score(self.current_score)
    }

    /// The full ledger in insertion (chronological) order.
    pub fn events(&self) -> &[TrustEvent] {
        &self.events
    }

    /// Up to `limit` events, newest first.
    pub fn recent_events(&self, limit: usize) -> Vec<&TrustEvent> {
        newest_first(&self.events)
            .into_iter()
            .take(limit)
            .map(|idx| &self.events[idx])
            .collect()
    }

    /// Append one event stamped `now` and recalculate.
    ///
    /// Impact is `impact_override` when given, otherwise the table value for
    /// `kind`. If this is the first positive-impact event on the record the
    /// first-transaction bonus is added to the stored impact. Admin manual
    /// adjustments are not exempt from the bonus.
    pub fn append_event(
        &mut self,
        kind: EventKind,
        impact_override: Option<i32>,
        refs: EventRefs,
        description: impl Into<String>,
        admin_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> AppliedEvent {
        let previous_score = self.current_score;
        let mut impact = impact_override.unwrap_or_else(|| kind.base_impact());

        let bonus_applied = self.is_first_transaction && impact > 0;
        if bonus_applied {
            impact += EventKind::FirstTransaction.base_impact();
            self.is_first_transaction = false;
        }

        let event = TrustEvent {
            kind,
            impact,
            refs,
            description: description.into(),
            admin_notes,
            occurred_at: now,
        };
        self.events.push(event.clone());

        self.total_transactions += 1;
        if impact > 0 {
            self.positive_transactions += 1;
        } else if impact < 0 {
            self.negative_transactions += 1;
        }

        self.last_activity_at = now;
        self.months_inactive = 0;
        self.updated_at = now;
        let outcome = self.recalculate();

        AppliedEvent {
            event,
            bonus_applied,
            previous_score,
            new_score: outcome.score,
            star_rating: outcome.star_rating,
        }
    }

    /// Apply the inactivity penalty if the user crossed the threshold.
    ///
    /// Returns whether anything changed. Once the counter is at or past the
    /// threshold, further calls are no-ops until an event resets it.
    pub fn apply_inactivity_decay(&mut self, now: DateTime<Utc>) -> bool {
        let months = months_between(self.last_activity_at, now);
        if months >= INACTIVITY_THRESHOLD_MONTHS && self.months_inactive < INACTIVITY_THRESHOLD_MONTHS {
            self.months_inactive = months;
            self.updated_at = now;
            self.recalculate();
            return true;
        }
        false
    }

    /// Refold the ledger into the derived score fields.
    fn recalculate(&mut self) -> ScoreOutcome {
        let outcome = recalculate(&self.events, self.months_inactive);
        self.current_score = outcome.score;
        self.star_rating = outcome.star_rating;
        outcome
    }

    /// All public fields plus the five most recent events.
    pub fn summary(&self) -> Summary {
        Summary {
            user_id: self.user_id,
            current_score: self.current_score,
            star_rating: self.star_rating,
            trust_level: self.trust_level(),
            total_transactions: self.total_transactions,
            positive_transactions: self.positive_transactions,
            negative_transactions: self.negative_transactions,
            last_activity_at: self.last_activity_at,
            months_inactive: self.months_inactive,
            is_first_transaction: self.is_first_transaction,
            recent_events: self
                .recent_events(SUMMARY_EVENT_LIMIT)
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// Subset safe to show other users. No admin notes, no ledger.
    pub fn public_summary(&self) -> PublicSummary {
        PublicSummary {
            user_id: self.user_id,
            current_score: self.current_score,
            star_rating: self.star_rating,
            trust_level: self.trust_level(),
            total_transactions: self.total_transactions,
            positive_transactions: self.positive_transactions,
            last_activity_at: self.last_activity_at,
            is_first_transaction: self.is_first_transaction,
        }
    }

    /// Summary plus the full ledger, newest first.
    pub fn detailed_summary(&self) -> DetailedSummary {
        DetailedSummary {
            summary: self.summary(),
            all_events: self
                .recent_events(self.events.len())
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// Fields mirrored onto the user profile.
    pub fn projection_update(&self) -> ProjectionUpdate {
        ProjectionUpdate {
            score: self.current_score,
            star_rating: self.star_rating,
            trust_level: self.trust_level(),
            total_transactions: self.total_transactions,
        }
    }
}
