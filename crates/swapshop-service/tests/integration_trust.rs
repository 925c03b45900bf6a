// crates/swapshop-service/tests/integration_trust.rs
//
// End-to-end tests for the trust-score stack: TrustScoreService over the
// in-memory and RocksDB stores, with projection stores attached.
//
// Covers concurrent initialization and updates, conflict retry and
// exhaustion, best-effort projection sync, reset auditing, eligibility
// gating, the inactivity sweep, and the ranking queries.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use swapshop_core::{
    EventKind, ProjectionSink, ProjectionUpdate, ScoreRecord, ScoreStore, SwapshopError, TrustLevel,
    UserId, UserProjection,
};
use swapshop_reputation::TransactionIntent;
use swapshop_service::{
    AdjustmentRequest, LifecycleAction, LifecycleHook, ServiceConfig, TrustScoreService,
};
use swapshop_store::{
    InMemoryProjectionStore, InMemoryScoreStore, RetryPolicy, RocksProjectionStore, RocksScoreStore,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a temporary directory path using UUID to avoid conflicts.
fn temp_db_path(label: &str) -> String {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("swapshop_test_{}_{}", label, Uuid::now_v7()));
    path.to_string_lossy().to_string()
}

fn config_with_retry(retry: RetryPolicy) -> ServiceConfig {
    ServiceConfig {
        retry,
        ..ServiceConfig::default()
    }
}

/// Generous retry budget for tests that hammer one record from many tasks.
fn contention_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 200,
        base_backoff_ms: 1,
        max_backoff_ms: 20,
    }
}

fn memory_service(config: ServiceConfig) -> (Arc<TrustScoreService>, Arc<InMemoryProjectionStore>) {
    let projection = Arc::new(InMemoryProjectionStore::new());
    let svc = TrustScoreService::new(Arc::new(InMemoryScoreStore::new()), projection.clone(), config);
    (Arc::new(svc), projection)
}

fn rocks_service(label: &str, config: ServiceConfig) -> (Arc<TrustScoreService>, Arc<RocksProjectionStore>) {
    let store = Arc::new(RocksScoreStore::open(&temp_db_path(label)).expect("open rocksdb"));
    let projection = Arc::new(RocksProjectionStore::new(store.clone()));
    let svc = TrustScoreService::new(store, projection.clone(), config);
    (Arc::new(svc), projection)
}

/// Bring a user to an exact score with admin adjustments.
///
/// `[-1, -167, -167, -168]`: the last three are recent (x2), the first is
/// older (x1): 650 + (2 * -502 - 1) / 5 = 449.
async fn seed_score_449(svc: &TrustScoreService, user: &UserId) {
    for impact in [-1, -167, -167, -168] {
        svc.apply_manual_adjustment(user, &AdjustmentRequest::new(impact, "seed"))
            .await
            .unwrap();
    }
}

/// `[-200, -200, -100]`, all recent: 650 + 2 * -500 / 5 = 450.
async fn seed_score_450(svc: &TrustScoreService, user: &UserId) {
    for impact in [-200, -200, -100] {
        svc.apply_manual_adjustment(user, &AdjustmentRequest::new(impact, "seed"))
            .await
            .unwrap();
    }
}

/// ScoreStore wrapper that fails the next N saves with a version conflict.
struct ConflictingStore {
    inner: InMemoryScoreStore,
    conflicts_remaining: AtomicU32,
    saves_attempted: AtomicU32,
}

impl ConflictingStore {
    fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryScoreStore::new(),
            conflicts_remaining: AtomicU32::new(conflicts),
            saves_attempted: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl ScoreStore for ConflictingStore {
    async fn get_record(&self, user_id: &UserId) -> Result<Option<ScoreRecord>, SwapshopError> {
        self.inner.get_record(user_id).await
    }

    async fn create_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError> {
        self.inner.create_record(record).await
    }

    async fn save_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError> {
        self.saves_attempted.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .conflicts_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(SwapshopError::ConcurrencyConflict("injected".to_string()));
        }
        self.inner.save_record(record).await
    }

    async fn replace_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError> {
        self.inner.replace_record(record).await
    }

    async fn list_records(&self) -> Result<Vec<ScoreRecord>, SwapshopError> {
        self.inner.list_records().await
    }

    async fn top_records(&self, limit: usize) -> Result<Vec<ScoreRecord>, SwapshopError> {
        self.inner.top_records(limit).await
    }

    async fn records_in_range(&self, min: u16, max: u16) -> Result<Vec<ScoreRecord>, SwapshopError> {
        self.inner.records_in_range(min, max).await
    }
}

/// ScoreStore whose writes always fail, as if the database were down.
struct UnavailableStore;

#[async_trait]
impl ScoreStore for UnavailableStore {
    async fn get_record(&self, _user_id: &UserId) -> Result<Option<ScoreRecord>, SwapshopError> {
        Err(SwapshopError::Storage("database unavailable".to_string()))
    }

    async fn create_record(&self, _record: &ScoreRecord) -> Result<u64, SwapshopError> {
        Err(SwapshopError::Storage("database unavailable".to_string()))
    }

    async fn save_record(&self, _record: &ScoreRecord) -> Result<u64, SwapshopError> {
        Err(SwapshopError::Storage("database unavailable".to_string()))
    }

    async fn replace_record(&self, _record: &ScoreRecord) -> Result<u64, SwapshopError> {
        Err(SwapshopError::Storage("database unavailable".to_string()))
    }

    async fn list_records(&self) -> Result<Vec<ScoreRecord>, SwapshopError> {
        Err(SwapshopError::Storage("database unavailable".to_string()))
    }

    async fn top_records(&self, _limit: usize) -> Result<Vec<ScoreRecord>, SwapshopError> {
        Err(SwapshopError::Storage("database unavailable".to_string()))
    }

    async fn records_in_range(&self, _min: u16, _max: u16) -> Result<Vec<ScoreRecord>, SwapshopError> {
        Err(SwapshopError::Storage("database unavailable".to_string()))
    }
}

/// Projection sink that always fails.
struct FailingProjection;

#[async_trait]
impl ProjectionSink for FailingProjection {
    async fn update_summary(
        &self,
        _user_id: &UserId,
        _update: &ProjectionUpdate,
    ) -> Result<(), SwapshopError> {
        Err(SwapshopError::ProjectionSync("profile store offline".to_string()))
    }

    async fn get_projection(&self, _user_id: &UserId) -> Result<Option<UserProjection>, SwapshopError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

async fn assert_single_record_under_concurrent_init(svc: Arc<TrustScoreService>) {
    let user = Uuid::now_v7();
    let mut handles = Vec::new();
    for _ in 0..16 {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move { svc.initialize(&user).await }));
    }

    let mut summaries = Vec::new();
    for h in handles {
        summaries.push(h.await.unwrap().unwrap());
    }

    assert!(summaries.iter().all(|s| s.user_id == user && s.current_score == 650));
    let records = svc.store().list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].version, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_initialization_creates_one_record_in_memory() {
    let (svc, _) = memory_service(ServiceConfig::default());
    assert_single_record_under_concurrent_init(svc).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_initialization_creates_one_record_rocks() {
    let (svc, _) = rocks_service("init_race", ServiceConfig::default());
    assert_single_record_under_concurrent_init(svc).await;
}

async fn assert_no_lost_updates(svc: Arc<TrustScoreService>) {
    let user = Uuid::now_v7();
    let writers = 12;
    let mut handles = Vec::new();
    for _ in 0..writers {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            svc.record_late_return(&user, Some(Uuid::now_v7())).await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let record = svc.get_record(&user).await.unwrap();
    assert_eq!(record.events().len(), writers);
    assert_eq!(record.negative_transactions, writers as u64);
    // 1 initial create + one save per writer.
    assert_eq!(record.version, 1 + writers as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_lose_nothing_in_memory() {
    let (svc, _) = memory_service(config_with_retry(contention_retry()));
    assert_no_lost_updates(svc).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_lose_nothing_rocks() {
    let (svc, _) = rocks_service("append_race", config_with_retry(contention_retry()));
    assert_no_lost_updates(svc).await;
}

#[tokio::test]
async fn test_conflict_is_retried_against_fresh_record() {
    let backend = Arc::new(ConflictingStore::new(2));
    let svc = TrustScoreService::new(
        backend.clone(),
        Arc::new(InMemoryProjectionStore::new()),
        config_with_retry(RetryPolicy::immediate(5)),
    );
    let user = Uuid::now_v7();

    let summary = svc.record_early_return(&user, None).await.unwrap();
    assert_eq!(summary.total_transactions, 1);
    assert_eq!(backend.saves_attempted.load(Ordering::SeqCst), 3);

    let record = svc.get_record(&user).await.unwrap();
    assert_eq!(record.events().len(), 1);
    assert_eq!(record.events()[0].kind, EventKind::BorrowerEarlyReturn);
}

#[tokio::test]
async fn test_exhausted_retries_surface_transient_failure() {
    let backend = Arc::new(ConflictingStore::new(100));
    let svc = TrustScoreService::new(
        backend.clone(),
        Arc::new(InMemoryProjectionStore::new()),
        config_with_retry(RetryPolicy::immediate(3)),
    );
    let user = Uuid::now_v7();

    let err = svc.record_late_return(&user, None).await.unwrap_err();
    assert!(matches!(err, SwapshopError::TransientFailure { attempts: 3, .. }));
    assert!(err.is_transient());
    assert_eq!(backend.saves_attempted.load(Ordering::SeqCst), 3);

    // The record exists (lazy creation succeeded) but nothing was appended.
    let record = svc.get_record(&user).await.unwrap();
    assert!(record.events().is_empty());
    assert_eq!(record.current_score(), 650);
}

// ---------------------------------------------------------------------------
// Projection and failure propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_projection_failure_does_not_fail_mutation() {
    let svc = TrustScoreService::new(
        Arc::new(InMemoryScoreStore::new()),
        Arc::new(FailingProjection),
        ServiceConfig::default(),
    );
    let user = Uuid::now_v7();

    let summary = svc.record_late_return(&user, None).await.unwrap();
    assert_eq!(summary.current_score, 630);
    assert_eq!(svc.get_record(&user).await.unwrap().current_score(), 630);

    // Explicit repair reports the failure.
    assert!(matches!(
        svc.resync(&user).await.unwrap_err(),
        SwapshopError::ProjectionSync(_)
    ));
    let report = svc.resync_all().await.unwrap();
    assert_eq!(report.successful, 0);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_projection_tracks_record_and_resync_repairs_drift() {
    let (svc, projection) = rocks_service("projection", ServiceConfig::default());
    let user = Uuid::now_v7();

    svc.record_non_return(&user, None).await.unwrap();
    let synced = projection.get_projection(&user).await.unwrap().unwrap();
    assert_eq!(synced.fields.score, 610);
    assert_eq!(synced.fields.total_transactions, 1);

    // Drift the projection by hand, then repair it.
    projection
        .update_summary(
            &user,
            &ProjectionUpdate {
                score: 900,
                star_rating: 5,
                trust_level: TrustLevel::Excellent,
                total_transactions: 0,
            },
        )
        .await
        .unwrap();
    let report = svc.resync_all().await.unwrap();
    assert_eq!(report.successful, 1);
    let repaired = projection.get_projection(&user).await.unwrap().unwrap();
    assert_eq!(repaired.fields.score, 610);
    assert_eq!(repaired.fields.trust_level, TrustLevel::Fair);
}

#[tokio::test]
async fn test_storage_failure_propagates_from_direct_calls() {
    let svc = Arc::new(TrustScoreService::new(
        Arc::new(UnavailableStore),
        Arc::new(InMemoryProjectionStore::new()),
        ServiceConfig::default(),
    ));
    let user = Uuid::now_v7();

    assert!(matches!(
        svc.validate(&user, TransactionIntent::Borrow).await.unwrap_err(),
        SwapshopError::Storage(_)
    ));
    assert!(svc.get_leaderboard(None).await.is_err());

    // The side-effect hook swallows the same failure.
    let hook = LifecycleHook::new(svc);
    let handled = hook
        .handle(LifecycleAction::ItemReturnedLate {
            borrower_id: user,
            transaction_ref: None,
        })
        .await;
    assert!(!handled);
}

// ---------------------------------------------------------------------------
// Ledger behaviour through the service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_first_transaction_bonus_lands_on_first_positive_event() {
    let (svc, _) = memory_service(ServiceConfig::default());
    let lender = Uuid::now_v7();
    let borrower = Uuid::now_v7();

    svc.record_late_return(&lender, None).await.unwrap();
    svc.record_lending_success(&lender, &borrower, None).await.unwrap();
    svc.record_lending_success(&lender, &borrower, None).await.unwrap();

    let record = svc.get_record(&lender).await.unwrap();
    let impacts: Vec<i32> = record.events().iter().map(|e| e.impact).collect();
    assert_eq!(impacts, vec![-50, 110, 80]);
    assert!(!record.is_first_transaction);
}

#[tokio::test]
async fn test_reset_leaves_single_audit_event() {
    let (svc, projection) = rocks_service("reset", ServiceConfig::default());
    let user = Uuid::now_v7();
    svc.record_non_return(&user, None).await.unwrap();
    svc.record_non_return(&user, None).await.unwrap();

    let summary = svc.reset(&user, "policy violation").await.unwrap();
    assert_eq!(summary.current_score, 650);
    assert_eq!(summary.total_transactions, 1);

    let record = svc.get_record(&user).await.unwrap();
    assert_eq!(record.events().len(), 1);
    let audit = &record.events()[0];
    assert_eq!(audit.impact, 0);
    assert_eq!(audit.kind, EventKind::ManualAdjustment);
    assert_eq!(audit.description, "Trust score reset by admin. Reason: policy violation");
    assert!(audit
        .admin_notes
        .as_deref()
        .is_some_and(|n| n.starts_with("Reset performed by admin on ")));
    assert!(record.is_first_transaction);

    let synced = projection.get_projection(&user).await.unwrap().unwrap();
    assert_eq!(synced.fields.score, 650);

    // The reset record sits at its new score in the index.
    let leaders = svc.get_leaderboard(None).await.unwrap();
    assert_eq!(leaders.len(), 1);
    assert_eq!(leaders[0].current_score, 650);
}

#[tokio::test]
async fn test_reset_validation() {
    let (svc, _) = memory_service(ServiceConfig::default());
    let unknown = Uuid::now_v7();
    assert!(matches!(
        svc.reset(&unknown, "cleanup").await.unwrap_err(),
        SwapshopError::NotFound(_)
    ));
    assert!(matches!(
        svc.reset(&unknown, "  ").await.unwrap_err(),
        SwapshopError::Validation(_)
    ));
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_eligibility_hard_block_boundary() {
    let (svc, _) = memory_service(ServiceConfig::default());

    let blocked = Uuid::now_v7();
    seed_score_449(&svc, &blocked).await;
    for intent in [TransactionIntent::Borrow, TransactionIntent::Lend] {
        let e = svc.validate(&blocked, intent).await.unwrap();
        assert_eq!(e.trust_score, 449);
        assert!(!e.eligible);
        assert!(!e.restrictions.is_empty());
    }

    let allowed = Uuid::now_v7();
    seed_score_450(&svc, &allowed).await;
    let borrow = svc.validate(&allowed, TransactionIntent::Borrow).await.unwrap();
    assert_eq!(borrow.trust_score, 450);
    assert!(borrow.eligible);
    assert!(borrow.restrictions.is_empty());
    // Low-score borrow warning plus recent negative activity.
    assert_eq!(borrow.warnings.len(), 2);

    let lend = svc.validate(&allowed, TransactionIntent::Lend).await.unwrap();
    assert!(lend.eligible);
    assert_eq!(lend.warnings.len(), 1);
}

#[tokio::test]
async fn test_validate_creates_record_lazily() {
    let (svc, projection) = memory_service(ServiceConfig::default());
    let user = Uuid::now_v7();
    let e = svc.validate(&user, TransactionIntent::Borrow).await.unwrap();
    assert!(e.eligible);
    assert!(e.warnings.is_empty());
    assert_eq!(e.trust_score, 650);
    assert!(projection.get_projection(&user).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Inactivity sweep
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_inactivity_sweep_is_idempotent() {
    let (svc, projection) = rocks_service("sweep", ServiceConfig::default());
    let now = Utc::now();

    let dormant = Uuid::now_v7();
    let backend = svc.store().backend().clone();
    backend
        .create_record(&ScoreRecord::new(dormant, now - Duration::days(400)))
        .await
        .unwrap();
    let active = Uuid::now_v7();
    svc.record_fulfilled_request(&active, None, None).await.unwrap();

    let first = svc.run_inactivity_sweep_at(now).await.unwrap();
    assert_eq!(first.scanned, 2);
    assert_eq!(first.failed, 0);
    assert_eq!(first.affected.len(), 1);
    assert_eq!(first.affected[0].user_id, dormant);
    assert_eq!(first.affected[0].new_score, 630);
    assert_eq!(first.affected[0].months_inactive, 13);

    let version_after_first = svc.get_record(&dormant).await.unwrap().version;

    let second = svc.run_inactivity_sweep_at(now + Duration::days(30)).await.unwrap();
    assert!(second.affected.is_empty());
    assert_eq!(svc.get_record(&dormant).await.unwrap().version, version_after_first);

    let synced = projection.get_projection(&dormant).await.unwrap().unwrap();
    assert_eq!(synced.fields.score, 630);

    // Activity clears the penalty and re-arms the sweep.
    let summary = svc.record_early_return(&dormant, None).await.unwrap();
    assert_eq!(summary.months_inactive, 0);
    assert!(summary.current_score > 650);
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_leaderboard_statistics_and_browse() {
    let (svc, _) = rocks_service("queries", ServiceConfig::default());

    let top = Uuid::now_v7();
    let mid = Uuid::now_v7();
    let low = Uuid::now_v7();
    let blocked = Uuid::now_v7();

    svc.apply_manual_adjustment(&top, &AdjustmentRequest::new(200, "mentor"))
        .await
        .unwrap(); // 650 + 2 * 230 / 5 = 742
    svc.initialize(&mid).await.unwrap(); // 650
    svc.record_non_return(&low, None).await.unwrap(); // 610
    seed_score_449(&svc, &blocked).await; // 449

    let leaders = svc.get_leaderboard(Some(3)).await.unwrap();
    let order: Vec<UserId> = leaders.iter().map(|s| s.user_id).collect();
    assert_eq!(order, vec![top, mid, low]);
    assert_eq!(leaders[0].trust_level, TrustLevel::Good);

    assert_eq!(svc.get_leaderboard(None).await.unwrap().len(), 4);
    assert_eq!(svc.get_leaderboard(Some(0)).await.unwrap().len(), 4);

    let stats = svc.get_statistics().await.unwrap();
    assert_eq!(stats.total_users, 4);
    assert_eq!(stats.highest_score, 742);
    assert_eq!(stats.lowest_score, 449);
    assert_eq!(stats.tiers.good, 1);
    assert_eq!(stats.tiers.fair, 2);
    assert_eq!(stats.tiers.very_poor, 1);
    assert_eq!(stats.total_transactions, 1 + 1 + 4);

    let fair = svc.browse(Some(TrustLevel::Fair), 1, None).await.unwrap();
    assert_eq!(fair.pagination.total_count, 2);
    assert_eq!(fair.items[0].user_id, mid);
    assert_eq!(fair.items[1].user_id, low);

    let page2 = svc.browse(None, 2, Some(3)).await.unwrap();
    assert_eq!(page2.pagination.total_pages, 2);
    assert_eq!(page2.items.len(), 1);
    assert_eq!(page2.items[0].user_id, blocked);
}

#[tokio::test]
async fn test_empty_statistics_use_base_score() {
    let (svc, _) = memory_service(ServiceConfig::default());
    let stats = svc.get_statistics().await.unwrap();
    assert_eq!(stats.total_users, 0);
    assert_eq!(stats.average_score, 650.0);
    assert_eq!(stats.highest_score, 650);
    assert_eq!(stats.lowest_score, 650);
}

#[tokio::test]
async fn test_detailed_and_public_views() {
    let (svc, _) = memory_service(ServiceConfig::default());
    let user = Uuid::now_v7();
    for _ in 0..7 {
        svc.record_early_return(&user, None).await.unwrap();
    }
    svc.apply_manual_adjustment(
        &user,
        &AdjustmentRequest::new(-5, "late fee dispute").with_notes("internal only"),
    )
    .await
    .unwrap();

    let summary = svc.get_summary(&user).await.unwrap();
    assert_eq!(summary.recent_events.len(), 5);
    assert_eq!(summary.recent_events[0].admin_notes.as_deref(), Some("internal only"));

    let detailed = svc.get_detailed(&user).await.unwrap();
    assert_eq!(detailed.all_events.len(), 8);
    assert_eq!(detailed.all_events[0].kind, EventKind::ManualAdjustment);

    let public = svc.get_public_summary(&user).await.unwrap();
    let json = serde_json::to_string(&public).unwrap();
    assert!(!json.contains("internal only"));
    assert_eq!(public.total_transactions, 8);
}
