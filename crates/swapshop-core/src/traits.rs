// crates/swapshop-core/src/traits.rs

use async_trait::async_trait;

use crate::error::SwapshopError;
use crate::identity::UserId;
use crate::record::ScoreRecord;
use crate::summary::{ProjectionUpdate, UserProjection};

/// Trait for persistent ScoreRecord storage.
///
/// Implemented by swapshop-store (RocksDB and in-memory backends). All
/// cross-request safety comes from these operations being atomic at the
/// storage layer; callers hold no locks between them.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Retrieve the record for a user, with its stored `version`.
    async fn get_record(&self, user_id: &UserId) -> Result<Option<ScoreRecord>, SwapshopError>;

    /// Insert a new record. Fails with `AlreadyExists` if the user already has one.
    ///
    /// Returns the stored version (always 1).
    async fn create_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError>;

    /// Overwrite a record if the stored version still equals `record.version`.
    ///
    /// Returns the new version. Fails with `ConcurrencyConflict` on mismatch
    /// and `NotFound` if the record disappeared.
    async fn save_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError>;

    /// Replace whatever record the user has with `record`, ignoring versions.
    ///
    /// Used by admin reset. The new version is strictly greater than the old
    /// one so in-flight saves against the old record conflict. Fails with
    /// `NotFound` if the user has no record.
    async fn replace_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError>;

    /// All records, in no particular order.
    async fn list_records(&self) -> Result<Vec<ScoreRecord>, SwapshopError>;

    /// Up to `limit` records ordered by score descending.
    async fn top_records(&self, limit: usize) -> Result<Vec<ScoreRecord>, SwapshopError>;

    /// Records with `min <= score < max`, ordered by score descending.
    async fn records_in_range(&self, min: u16, max: u16) -> Result<Vec<ScoreRecord>, SwapshopError>;
}

/// Trait for the denormalized user-profile projection.
///
/// The core writes to it after every record mutation and never reads it
/// back for decisions.
#[async_trait]
pub trait ProjectionSink: Send + Sync {
    /// Overwrite the trust fields on the user's profile.
    async fn update_summary(
        &self,
        user_id: &UserId,
        update: &ProjectionUpdate,
    ) -> Result<(), SwapshopError>;

    /// Read back the stored projection (diagnostics and drift checks).
    async fn get_projection(&self, user_id: &UserId) -> Result<Option<UserProjection>, SwapshopError>;
}
