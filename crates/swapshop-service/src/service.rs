// crates/swapshop-service/src/service.rs
//
// TrustScoreService: the entry point external callers use.
//
// Every mutation follows the same path:
//   get-or-create -> append event (or decay) -> recalculate -> versioned save
//   -> push projection
// The record save is authoritative. The projection push afterwards is best
// effort: a failure is logged and the operation still succeeds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use swapshop_core::event::{truncate_text, MAX_ADMIN_NOTES_LEN, MAX_DESCRIPTION_LEN};
use swapshop_core::{
    AppliedEvent, DetailedSummary, EventKind, EventRefs, ProjectionSink, PublicSummary,
    RequestRef, ScoreRecord, ScoreStore, Summary, SwapshopError, TransactionRef, TrustLevel,
    UserId,
};
use swapshop_reputation::{evaluate, paginate, AdminRow, AggregateStats, Eligibility, Page, TransactionIntent};
use swapshop_store::TrustScoreStore;

use crate::admin::{require_reason, AdjustmentRequest, PenaltyRequest};
use crate::config::ServiceConfig;

const DESC_LENDER_ONTIME: &str = "Successfully lent item, returned on time";
const DESC_BORROWER_ONTIME: &str = "Returned borrowed item on time";
const DESC_EARLY_RETURN: &str = "Returned borrowed item early";
const DESC_LATE_RETURN: &str = "Returned borrowed item late";
const DESC_NON_RETURN: &str = "Failed to return borrowed item - dispute opened";
const DESC_UNFAIR_CANCEL: &str = "Unfairly cancelled lending agreement";
const DEFAULT_REQUEST_TITLE: &str = "Item request";

/// Summaries for both sides of a successful lending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingOutcome {
    pub lender: Summary,
    pub borrower: Summary,
}

/// A user whose score changed during an inactivity sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayedUser {
    pub user_id: UserId,
    pub new_score: u16,
    pub months_inactive: u32,
}

/// Result of an inactivity sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Records the sweep looked at.
    pub scanned: usize,
    /// Records that received the inactivity penalty.
    pub affected: Vec<DecayedUser>,
    /// Records that could not be updated; a rerun picks them up.
    pub failed: usize,
}

/// Result of a bulk initialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitReport {
    pub initialized: usize,
    pub existing: usize,
    pub errors: Vec<InitFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitFailure {
    pub user_id: UserId,
    pub error: String,
}

/// Result of a bulk projection resync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub successful: usize,
    pub failed: usize,
}

/// Orchestrates trust-score mutations, queries, and projection sync.
pub struct TrustScoreService {
    store: TrustScoreStore,
    projection: Arc<dyn ProjectionSink>,
    config: ServiceConfig,
}

impl std::fmt::Debug for TrustScoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustScoreService")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TrustScoreService {
    pub fn new(
        backend: Arc<dyn ScoreStore>,
        projection: Arc<dyn ProjectionSink>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store: TrustScoreStore::new(backend, config.retry),
            projection,
            config,
        }
    }

    pub fn store(&self) -> &TrustScoreStore {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Lifecycle events
    // ---------------------------------------------------------------

    /// On-time return: the lender and the borrower both gain.
    pub async fn record_lending_success(
        &self,
        lender_id: &UserId,
        borrower_id: &UserId,
        transaction_ref: Option<TransactionRef>,
    ) -> Result<LendingOutcome, SwapshopError> {
        let refs = transaction_refs(transaction_ref);
        let (lender, borrower) = tokio::join!(
            self.record_event(
                lender_id,
                EventKind::LenderOntimeReturn,
                None,
                refs,
                DESC_LENDER_ONTIME.to_string(),
                None,
            ),
            self.record_event(
                borrower_id,
                EventKind::BorrowerOntimeReturn,
                None,
                refs,
                DESC_BORROWER_ONTIME.to_string(),
                None,
            ),
        );
        Ok(LendingOutcome {
            lender: lender?.0,
            borrower: borrower?.0,
        })
    }

    pub async fn record_early_return(
        &self,
        borrower_id: &UserId,
        transaction_ref: Option<TransactionRef>,
    ) -> Result<Summary, SwapshopError> {
        self.record_simple(borrower_id, EventKind::BorrowerEarlyReturn, transaction_ref, DESC_EARLY_RETURN)
            .await
    }

    pub async fn record_late_return(
        &self,
        borrower_id: &UserId,
        transaction_ref: Option<TransactionRef>,
    ) -> Result<Summary, SwapshopError> {
        self.record_simple(borrower_id, EventKind::LateReturn, transaction_ref, DESC_LATE_RETURN)
            .await
    }

    pub async fn record_non_return(
        &self,
        borrower_id: &UserId,
        transaction_ref: Option<TransactionRef>,
    ) -> Result<Summary, SwapshopError> {
        self.record_simple(borrower_id, EventKind::NonReturnDispute, transaction_ref, DESC_NON_RETURN)
            .await
    }

    pub async fn record_unfair_cancel(
        &self,
        lender_id: &UserId,
        transaction_ref: Option<TransactionRef>,
    ) -> Result<Summary, SwapshopError> {
        self.record_simple(lender_id, EventKind::LenderUnfairCancel, transaction_ref, DESC_UNFAIR_CANCEL)
            .await
    }

    /// The helper fulfilled someone else's item request.
    pub async fn record_fulfilled_request(
        &self,
        helper_id: &UserId,
        request_ref: Option<RequestRef>,
        request_title: Option<&str>,
    ) -> Result<Summary, SwapshopError> {
        let title = request_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_REQUEST_TITLE);
        let refs = EventRefs {
            transaction_ref: None,
            request_ref,
        };
        self.record_event(
            helper_id,
            EventKind::FulfilledRequest,
            None,
            refs,
            format!("Fulfilled another user's request: {}", title),
            None,
        )
        .await
        .map(|(summary, _)| summary)
    }

    async fn record_simple(
        &self,
        user_id: &UserId,
        kind: EventKind,
        transaction_ref: Option<TransactionRef>,
        description: &str,
    ) -> Result<Summary, SwapshopError> {
        self.record_event(
            user_id,
            kind,
            None,
            transaction_refs(transaction_ref),
            description.to_string(),
            None,
        )
        .await
        .map(|(summary, _)| summary)
    }

    // ---------------------------------------------------------------
    // Admin actions
    // ---------------------------------------------------------------

    /// Apply an admin penalty. Validated before any record is touched.
    pub async fn apply_admin_penalty(
        &self,
        user_id: &UserId,
        request: &PenaltyRequest,
    ) -> Result<Summary, SwapshopError> {
        let impact = request.validate(&self.config)?;
        let (summary, applied) = self
            .record_event(
                user_id,
                EventKind::AdminPenalty,
                Some(impact),
                EventRefs::default(),
                request.reason.trim().to_string(),
                request.admin_notes.clone(),
            )
            .await?;
        info!(user_id = %user_id, impact = applied.event.impact, "Admin penalty applied");
        Ok(summary)
    }

    /// Apply an admin manual adjustment. Validated before any record is touched.
    ///
    /// A positive adjustment on a record that has never had a positive event
    /// consumes the first-transaction bonus like any other positive event.
    pub async fn apply_manual_adjustment(
        &self,
        user_id: &UserId,
        request: &AdjustmentRequest,
    ) -> Result<Summary, SwapshopError> {
        request.validate(&self.config)?;
        let (summary, applied) = self
            .record_event(
                user_id,
                EventKind::ManualAdjustment,
                Some(request.impact),
                EventRefs::default(),
                request.reason.trim().to_string(),
                Some(request.notes_or_default()),
            )
            .await?;
        info!(
            user_id = %user_id,
            requested = request.impact,
            applied = applied.event.impact,
            bonus = applied.bonus_applied,
            "Manual adjustment applied"
        );
        Ok(summary)
    }

    /// Reset a user's record to the base score with an audit event.
    pub async fn reset(&self, user_id: &UserId, reason: &str) -> Result<Summary, SwapshopError> {
        require_reason(reason)?;
        let record = self.store.reset(user_id, reason.trim()).await?;
        info!(user_id = %user_id, score = record.current_score(), "Trust score reset");
        self.sync_projection(&record).await;
        Ok(record.summary())
    }

    // ---------------------------------------------------------------
    // Inactivity sweep
    // ---------------------------------------------------------------

    pub async fn run_inactivity_sweep(&self) -> Result<SweepReport, SwapshopError> {
        self.run_inactivity_sweep_at(Utc::now()).await
    }

    /// Apply inactivity decay to every record as of `now`.
    ///
    /// Unchanged records are not written. Each record is updated on its
    /// own, so an interrupted sweep can simply be run again.
    pub async fn run_inactivity_sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, SwapshopError> {
        let records = self.store.list().await?;
        let mut report = SweepReport {
            scanned: records.len(),
            ..SweepReport::default()
        };

        for candidate in records {
            let user_id = candidate.user_id;
            let result = self
                .store
                .update_existing(&user_id, |record| {
                    record
                        .apply_inactivity_decay(now)
                        .then(|| (record.current_score(), record.months_inactive))
                })
                .await;

            match result {
                Ok((record, Some((new_score, months_inactive)))) => {
                    info!(user_id = %user_id, score = new_score, months_inactive, "Inactivity penalty applied");
                    self.sync_projection(&record).await;
                    report.affected.push(DecayedUser {
                        user_id,
                        new_score,
                        months_inactive,
                    });
                }
                Ok((_, None)) => {}
                Err(e) => {
                    warn!(user_id = %user_id, "Inactivity sweep failed for record: {}", e);
                    report.failed += 1;
                }
            }
        }

        info!(
            scanned = report.scanned,
            affected = report.affected.len(),
            failed = report.failed,
            "Inactivity sweep complete"
        );
        Ok(report)
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Eligibility is decided on the authoritative record, never the projection.
    pub async fn validate(
        &self,
        user_id: &UserId,
        intent: TransactionIntent,
    ) -> Result<Eligibility, SwapshopError> {
        let record = self.load_or_init(user_id).await?;
        Ok(evaluate(&record, intent))
    }

    pub async fn get_summary(&self, user_id: &UserId) -> Result<Summary, SwapshopError> {
        Ok(self.load_or_init(user_id).await?.summary())
    }

    pub async fn get_public_summary(&self, user_id: &UserId) -> Result<PublicSummary, SwapshopError> {
        Ok(self.load_or_init(user_id).await?.public_summary())
    }

    pub async fn get_detailed(&self, user_id: &UserId) -> Result<DetailedSummary, SwapshopError> {
        Ok(self.load_or_init(user_id).await?.detailed_summary())
    }

    /// Raw record for admin inspection. Does not create one.
    pub async fn get_record(&self, user_id: &UserId) -> Result<ScoreRecord, SwapshopError> {
        self.store.get(user_id).await?.ok_or_else(|| {
            SwapshopError::NotFound(format!("Trust score record for user {}", user_id))
        })
    }

    pub async fn get_leaderboard(&self, limit: Option<usize>) -> Result<Vec<PublicSummary>, SwapshopError> {
        let limit = self.config.leaderboard_limit(limit);
        let records = self.store.leaderboard(limit).await?;
        Ok(records.iter().map(ScoreRecord::public_summary).collect())
    }

    pub async fn get_statistics(&self) -> Result<AggregateStats, SwapshopError> {
        self.store.statistics().await
    }

    /// Admin listing, best first, optionally restricted to one trust level.
    pub async fn browse(
        &self,
        level: Option<TrustLevel>,
        page: usize,
        limit: Option<usize>,
    ) -> Result<Page<AdminRow>, SwapshopError> {
        let records = match level {
            Some(level) => self.store.by_level(level).await?,
            None => self.store.list_ranked().await?,
        };
        let rows: Vec<AdminRow> = records.iter().map(AdminRow::from).collect();
        Ok(paginate(rows, page, self.config.page_limit(limit)))
    }

    // ---------------------------------------------------------------
    // Initialization and projection repair
    // ---------------------------------------------------------------

    /// Ensure the user has a record and the projection reflects it.
    pub async fn initialize(&self, user_id: &UserId) -> Result<Summary, SwapshopError> {
        let (record, created) = self.store.get_or_create_flagged(user_id).await?;
        if created {
            info!(user_id = %user_id, score = record.current_score(), "Trust score initialized");
        }
        self.sync_projection(&record).await;
        Ok(record.summary())
    }

    /// Initialize many users, reporting how many were new.
    pub async fn initialize_all(&self, user_ids: &[UserId]) -> InitReport {
        let mut report = InitReport::default();
        for user_id in user_ids {
            match self.store.get_or_create_flagged(user_id).await {
                Ok((record, created)) => {
                    if created {
                        report.initialized += 1;
                    } else {
                        report.existing += 1;
                    }
                    self.sync_projection(&record).await;
                }
                Err(e) => {
                    warn!(user_id = %user_id, "Failed to initialize trust score: {}", e);
                    report.errors.push(InitFailure {
                        user_id: *user_id,
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(
            initialized = report.initialized,
            existing = report.existing,
            errors = report.errors.len(),
            "Bulk trust score initialization complete"
        );
        report
    }

    /// Rewrite one user's projection from the authoritative record.
    ///
    /// Unlike the push after a mutation, a failure here is returned.
    pub async fn resync(&self, user_id: &UserId) -> Result<(), SwapshopError> {
        let record = self.get_record(user_id).await?;
        self.projection
            .update_summary(user_id, &record.projection_update())
            .await
    }

    /// Rewrite every projection from the authoritative records.
    pub async fn resync_all(&self) -> Result<SyncReport, SwapshopError> {
        let records = self.store.list().await?;
        let mut report = SyncReport::default();
        for record in &records {
            match self
                .projection
                .update_summary(&record.user_id, &record.projection_update())
                .await
            {
                Ok(()) => report.successful += 1,
                Err(e) => {
                    warn!(user_id = %record.user_id, "Projection resync failed: {}", e);
                    report.failed += 1;
                }
            }
        }
        info!(successful = report.successful, failed = report.failed, "Projection resync complete");
        Ok(report)
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    /// Append one event through the retrying update cycle, then push the
    /// projection. Text is cut to the stored limits.
    async fn record_event(
        &self,
        user_id: &UserId,
        kind: EventKind,
        impact: Option<i32>,
        refs: EventRefs,
        description: String,
        admin_notes: Option<String>,
    ) -> Result<(Summary, AppliedEvent), SwapshopError> {
        let description = truncate_text(&description, MAX_DESCRIPTION_LEN);
        let admin_notes = admin_notes.map(|n| truncate_text(&n, MAX_ADMIN_NOTES_LEN));

        let (record, applied) = self
            .store
            .update(user_id, |record| {
                Some(record.append_event(
                    kind,
                    impact,
                    refs,
                    description.clone(),
                    admin_notes.clone(),
                    Utc::now(),
                ))
            })
            .await?;
        let applied = applied.ok_or_else(|| {
            SwapshopError::Storage(format!("Update for user {} recorded no event", user_id))
        })?;

        info!(
            user_id = %user_id,
            kind = %kind,
            impact = applied.event.impact,
            previous = applied.previous_score,
            score = applied.new_score,
            stars = applied.star_rating,
            "Trust event recorded"
        );

        self.sync_projection(&record).await;
        Ok((record.summary(), applied))
    }

    /// Load for a read, creating the record lazily and pushing the
    /// projection if this call created it.
    async fn load_or_init(&self, user_id: &UserId) -> Result<ScoreRecord, SwapshopError> {
        let (record, created) = self.store.get_or_create_flagged(user_id).await?;
        if created {
            self.sync_projection(&record).await;
        }
        Ok(record)
    }

    /// Best-effort projection push. Failures are logged, never returned.
    async fn sync_projection(&self, record: &ScoreRecord) {
        if let Err(e) = self
            .projection
            .update_summary(&record.user_id, &record.projection_update())
            .await
        {
            warn!(
                user_id = %record.user_id,
                score = record.current_score(),
                "Failed to sync trust score to user profile: {}",
                e
            );
        }
    }
}

fn transaction_refs(transaction_ref: Option<TransactionRef>) -> EventRefs {
    EventRefs {
        transaction_ref,
        request_ref: None,
    }
}
