// crates/swapshop-core/src/summary.rs
//
// Read models handed to collaborators: summaries of a ScoreRecord and the
// denormalized projection stored on the user profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::TrustEvent;
use crate::identity::UserId;
use crate::tier::TrustLevel;

/// Owner/admin view of a record: all public fields plus recent events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub user_id: UserId,
    pub current_score: u16,
    pub star_rating: u8,
    pub trust_level: TrustLevel,
    pub total_transactions: u64,
    pub positive_transactions: u64,
    pub negative_transactions: u64,
    pub last_activity_at: DateTime<Utc>,
    pub months_inactive: u32,
    pub is_first_transaction: bool,
    /// Up to five events, newest first.
    pub recent_events: Vec<TrustEvent>,
}

/// View of a record that other users may see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicSummary {
    pub user_id: UserId,
    pub current_score: u16,
    pub star_rating: u8,
    pub trust_level: TrustLevel,
    pub total_transactions: u64,
    pub positive_transactions: u64,
    pub last_activity_at: DateTime<Utc>,
    pub is_first_transaction: bool,
}

/// Summary plus the full ledger, newest first. Owner view only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedSummary {
    #[serde(flatten)]
    pub summary: Summary,
    pub all_events: Vec<TrustEvent>,
}

/// Fields pushed to the user profile after every record mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionUpdate {
    pub score: u16,
    pub star_rating: u8,
    pub trust_level: TrustLevel,
    pub total_transactions: u64,
}

/// The denormalized copy as stored on the user profile.
///
/// Eventually consistent with the ScoreRecord and never used for decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProjection {
    pub user_id: UserId,
    #[serde(flatten)]
    pub fields: ProjectionUpdate,
    pub last_synced_at: DateTime<Utc>,
}
