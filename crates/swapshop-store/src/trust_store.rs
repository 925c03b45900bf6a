// crates/swapshop-store/src/trust_store.rs
//
// TrustScoreStore: the persistence boundary the service talks to.
//
// Wraps any `ScoreStore` backend and adds the two race-sensitive contracts:
//
//   - get-or-create: create relies on the backend's uniqueness check; losing
//     the race means "someone else created it", so we reload theirs.
//   - update: optimistic read-mutate-save. A version conflict reruns the
//     whole cycle against a freshly loaded record, up to the retry policy's
//     attempt count, then surfaces `TransientFailure`.
//
// No in-process locks are held between backend calls.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use swapshop_core::error::SwapshopError;
use swapshop_core::event::{truncate_text, MAX_ADMIN_NOTES_LEN, MAX_DESCRIPTION_LEN};
use swapshop_core::record::ScoreRecord;
use swapshop_core::traits::ScoreStore;
use swapshop_core::{EventKind, EventRefs, TrustLevel, UserId};
use swapshop_reputation::AggregateStats;

use crate::retry::RetryPolicy;

/// Whether an update cycle may create a missing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingRecord {
    Create,
    Fail,
}

/// Get-or-create, retrying updates, reset, and queries over a `ScoreStore`.
#[derive(Clone)]
pub struct TrustScoreStore {
    backend: Arc<dyn ScoreStore>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for TrustScoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustScoreStore")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl TrustScoreStore {
    pub fn new(backend: Arc<dyn ScoreStore>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    pub fn backend(&self) -> &Arc<dyn ScoreStore> {
        &self.backend
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Load a record without creating it.
    pub async fn get(&self, user_id: &UserId) -> Result<Option<ScoreRecord>, SwapshopError> {
        self.backend.get_record(user_id).await
    }

    /// Load the user's record, creating it at the base score if absent.
    ///
    /// At most one record is ever created per user: concurrent callers that
    /// lose the create race reload and return the winner's record.
    pub async fn get_or_create(&self, user_id: &UserId) -> Result<ScoreRecord, SwapshopError> {
        self.get_or_create_flagged(user_id).await.map(|(record, _)| record)
    }

    /// As `get_or_create`, also reporting whether this call created the record.
    pub async fn get_or_create_flagged(
        &self,
        user_id: &UserId,
    ) -> Result<(ScoreRecord, bool), SwapshopError> {
        if let Some(record) = self.backend.get_record(user_id).await? {
            return Ok((record, false));
        }

        let mut fresh = ScoreRecord::new(*user_id, Utc::now());
        match self.backend.create_record(&fresh).await {
            Ok(version) => {
                fresh.version = version;
                debug!(user_id = %user_id, "Created trust score record");
                Ok((fresh, true))
            }
            Err(SwapshopError::AlreadyExists(_)) => {
                debug!(user_id = %user_id, "Lost create race, reloading existing record");
                let record = self.backend.get_record(user_id).await?.ok_or_else(|| {
                    SwapshopError::Storage(format!(
                        "Record for user {} reported as existing but could not be loaded",
                        user_id
                    ))
                })?;
                Ok((record, false))
            }
            Err(e) => Err(e),
        }
    }

    /// Run an optimistic update cycle, creating the record if needed.
    ///
    /// `mutate` is called on a freshly loaded record each attempt. Returning
    /// `None` means "nothing to change": the record is returned unsaved.
    /// On success the returned record carries the new stored version.
    pub async fn update<T, F>(
        &self,
        user_id: &UserId,
        mutate: F,
    ) -> Result<(ScoreRecord, Option<T>), SwapshopError>
    where
        F: FnMut(&mut ScoreRecord) -> Option<T> + Send,
        T: Send,
    {
        self.update_cycle(user_id, MissingRecord::Create, mutate).await
    }

    /// Run an optimistic update cycle on an existing record.
    ///
    /// Fails with `NotFound` if the user has no record.
    pub async fn update_existing<T, F>(
        &self,
        user_id: &UserId,
        mutate: F,
    ) -> Result<(ScoreRecord, Option<T>), SwapshopError>
    where
        F: FnMut(&mut ScoreRecord) -> Option<T> + Send,
        T: Send,
    {
        self.update_cycle(user_id, MissingRecord::Fail, mutate).await
    }

    async fn load(&self, user_id: &UserId, missing: MissingRecord) -> Result<ScoreRecord, SwapshopError> {
        match missing {
            MissingRecord::Create => self.get_or_create(user_id).await,
            MissingRecord::Fail => self.backend.get_record(user_id).await?.ok_or_else(|| {
                SwapshopError::NotFound(format!("Trust score record for user {}", user_id))
            }),
        }
    }

    async fn update_cycle<T, F>(
        &self,
        user_id: &UserId,
        missing: MissingRecord,
        mut mutate: F,
    ) -> Result<(ScoreRecord, Option<T>), SwapshopError>
    where
        F: FnMut(&mut ScoreRecord) -> Option<T> + Send,
        T: Send,
    {
        let attempts = self.retry.attempts();
        let mut last_conflict = String::new();

        for attempt in 1..=attempts {
            let mut record = self.load(user_id, missing).await?;

            let Some(output) = mutate(&mut record) else {
                return Ok((record, None));
            };

            match self.backend.save_record(&record).await {
                Ok(version) => {
                    record.version = version;
                    return Ok((record, Some(output)));
                }
                Err(SwapshopError::ConcurrencyConflict(msg)) => {
                    warn!(
                        user_id = %user_id,
                        attempt,
                        max_attempts = attempts,
                        "Version conflict saving trust score record: {}",
                        msg
                    );
                    last_conflict = msg;
                    if attempt < attempts {
                        let delay = self.retry.backoff(attempt);
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(SwapshopError::TransientFailure {
            attempts,
            message: format!(
                "Gave up updating trust score for user {}: {}",
                user_id, last_conflict
            ),
        })
    }

    /// Replace the user's record with a fresh one carrying a single
    /// zero-impact audit event that names `reason`.
    ///
    /// The stored version keeps increasing, so saves racing against the old
    /// record conflict and retry against the reset one.
    pub async fn reset(&self, user_id: &UserId, reason: &str) -> Result<ScoreRecord, SwapshopError> {
        if self.backend.get_record(user_id).await?.is_none() {
            return Err(SwapshopError::NotFound(format!(
                "Trust score record for user {}",
                user_id
            )));
        }

        let now = Utc::now();
        let mut fresh = ScoreRecord::new(*user_id, now);
        fresh.append_event(
            EventKind::ManualAdjustment,
            Some(0),
            EventRefs::default(),
            truncate_text(
                &format!("Trust score reset by admin. Reason: {}", reason),
                MAX_DESCRIPTION_LEN,
            ),
            Some(truncate_text(
                &format!("Reset performed by admin on {}", now.to_rfc3339()),
                MAX_ADMIN_NOTES_LEN,
            )),
            now,
        );

        fresh.version = self.backend.replace_record(&fresh).await?;
        Ok(fresh)
    }

    /// Highest-scoring records, best first.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<ScoreRecord>, SwapshopError> {
        self.backend.top_records(limit).await
    }

    /// All records in a trust level, best first.
    pub async fn by_level(&self, level: TrustLevel) -> Result<Vec<ScoreRecord>, SwapshopError> {
        let (min, max) = level.score_range();
        self.backend.records_in_range(min, max).await
    }

    /// All records, best first.
    pub async fn list_ranked(&self) -> Result<Vec<ScoreRecord>, SwapshopError> {
        let mut records = self.backend.list_records().await?;
        records.sort_by(|a, b| {
            b.current_score()
                .cmp(&a.current_score())
                .then(a.user_id.cmp(&b.user_id))
        });
        Ok(records)
    }

    /// All records, unordered.
    pub async fn list(&self) -> Result<Vec<ScoreRecord>, SwapshopError> {
        self.backend.list_records().await
    }

    pub async fn statistics(&self) -> Result<AggregateStats, SwapshopError> {
        let records = self.backend.list_records().await?;
        Ok(AggregateStats::from_records(&records))
    }
}
