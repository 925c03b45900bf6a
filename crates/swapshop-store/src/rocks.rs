// crates/swapshop-store/src/rocks.rs
//
// RocksDB-backed persistent storage for ScoreRecords.
//
// Key format:
//   - Primary:   `record:{user_uuid}` -> JSON-serialized ScoreRecord
//   - Secondary: `score:{900 - score:03}:{user_uuid}` -> empty value (index only)
//
// The secondary index is written in the same transaction as the record, so
// it never disagrees with the primary. Inverting the score makes ascending
// key order equal descending score order, which serves the leaderboard and
// tier browsing without a full scan.
//
// Writes go through an OptimisticTransactionDB. Every write transaction
// reads the primary key with `get_for_update`, so two writers racing on the
// same user cannot both commit: the loser's commit fails with `Busy`.

use async_trait::async_trait;
use rocksdb::{ErrorKind, MultiThreaded, OptimisticTransactionDB, Options, Transaction};
use uuid::Uuid;

use swapshop_core::error::SwapshopError;
use swapshop_core::record::ScoreRecord;
use swapshop_core::tier::MAX_SCORE;
use swapshop_core::traits::ScoreStore;
use swapshop_core::UserId;

type Db = OptimisticTransactionDB<MultiThreaded>;

const RECORD_PREFIX: &str = "record:";
const SCORE_PREFIX: &str = "score:";

/// RocksDB wrapper implementing the `ScoreStore` trait.
pub struct RocksScoreStore {
    db: Db,
    path: String,
}

impl std::fmt::Debug for RocksScoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksScoreStore")
            .field("path", &self.path)
            .finish()
    }
}

impl RocksScoreStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, SwapshopError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = Db::open(&opts, path).map_err(|e| {
            SwapshopError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        Ok(Self {
            db,
            path: path.to_string(),
        })
    }

    /// Filesystem path of the open database.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Build the primary key for a record: `record:{uuid}`.
    fn record_key(user_id: &UserId) -> Vec<u8> {
        format!("{}{}", RECORD_PREFIX, user_id).into_bytes()
    }

    /// Build the secondary index key: `score:{inverted:03}:{uuid}`.
    fn score_key(score: u16, user_id: &UserId) -> Vec<u8> {
        format!("{}{:03}:{}", SCORE_PREFIX, MAX_SCORE - score.min(MAX_SCORE), user_id).into_bytes()
    }

    /// Parse `(score, user_id)` back out of a secondary index key.
    fn parse_score_key(key: &[u8]) -> Option<(u16, UserId)> {
        let rest = std::str::from_utf8(key).ok()?.strip_prefix(SCORE_PREFIX)?;
        let (inverted, uuid) = rest.split_once(':')?;
        let inverted: u16 = inverted.parse().ok()?;
        let user_id = Uuid::parse_str(uuid).ok()?;
        Some((MAX_SCORE.checked_sub(inverted)?, user_id))
    }

    fn decode(bytes: &[u8]) -> Result<ScoreRecord, SwapshopError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Get a record without going through the async trait.
    pub fn get_record_sync(&self, user_id: &UserId) -> Result<Option<ScoreRecord>, SwapshopError> {
        match self.get_raw(&Self::record_key(user_id))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get raw bytes from RocksDB, mapping errors to SwapshopError::Storage.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, SwapshopError> {
        self.db
            .get(key)
            .map_err(|e| SwapshopError::Storage(format!("RocksDB get failed: {}", e)))
    }

    /// Store a value under an arbitrary key. Used by `RocksProjectionStore`.
    pub fn put_bytes(&self, key: &[u8], value: &[u8]) -> Result<(), SwapshopError> {
        self.db
            .put(key, value)
            .map_err(|e| SwapshopError::Storage(format!("RocksDB put failed: {}", e)))
    }

    /// Retrieve a value by arbitrary key. Used by `RocksProjectionStore`.
    pub fn get_bytes(&self, key: &[u8]) -> Result<Option<Vec<u8>>, SwapshopError> {
        self.get_raw(key)
    }

    /// Read the current record inside a transaction, registering the key for
    /// conflict detection at commit.
    fn read_for_update(
        txn: &Transaction<'_, Db>,
        key: &[u8],
    ) -> Result<Option<ScoreRecord>, SwapshopError> {
        let bytes = txn
            .get_for_update(key, true)
            .map_err(|e| SwapshopError::Storage(format!("RocksDB get_for_update failed: {}", e)))?;
        bytes.map(|b| Self::decode(&b)).transpose()
    }

    /// Stage the record and its index entry, replacing `previous`'s index entry.
    fn stage_write(
        txn: &Transaction<'_, Db>,
        previous: Option<&ScoreRecord>,
        record: &ScoreRecord,
    ) -> Result<(), SwapshopError> {
        let storage = |e: rocksdb::Error| SwapshopError::Storage(format!("RocksDB write failed: {}", e));

        if let Some(prev) = previous {
            if prev.current_score() != record.current_score() {
                txn.delete(Self::score_key(prev.current_score(), &prev.user_id))
                    .map_err(storage)?;
            }
        }
        let json = serde_json::to_vec(record)?;
        txn.put(Self::record_key(&record.user_id), json).map_err(storage)?;
        // Existence is the signal; the value is empty.
        txn.put(Self::score_key(record.current_score(), &record.user_id), b"")
            .map_err(storage)?;
        Ok(())
    }

    /// Commit, translating write-write conflicts into `on_conflict`.
    fn commit(
        txn: Transaction<'_, Db>,
        on_conflict: impl FnOnce() -> SwapshopError,
    ) -> Result<(), SwapshopError> {
        match txn.commit() {
            Ok(()) => Ok(()),
            Err(e) if matches!(e.kind(), ErrorKind::Busy | ErrorKind::TryAgain) => Err(on_conflict()),
            Err(e) => Err(SwapshopError::Storage(format!("RocksDB commit failed: {}", e))),
        }
    }

    /// Walk the score index from the highest score down, stopping when
    /// `visit` returns false.
    fn scan_score_index(
        &self,
        mut visit: impl FnMut(u16, UserId) -> Result<bool, SwapshopError>,
    ) -> Result<(), SwapshopError> {
        let prefix = SCORE_PREFIX.as_bytes();
        for item in self.db.prefix_iterator(prefix) {
            let (key, _value) = item
                .map_err(|e| SwapshopError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Stop when the prefix no longer matches.
            if !key.starts_with(prefix) {
                break;
            }
            if let Some((score, user_id)) = Self::parse_score_key(&key) {
                if !visit(score, user_id)? {
                    break;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ScoreStore for RocksScoreStore {
    async fn get_record(&self, user_id: &UserId) -> Result<Option<ScoreRecord>, SwapshopError> {
        self.get_record_sync(user_id)
    }

    async fn create_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError> {
        let key = Self::record_key(&record.user_id);
        let already = || SwapshopError::AlreadyExists(format!("Score record for user {}", record.user_id));

        let txn = self.db.transaction();
        if Self::read_for_update(&txn, &key)?.is_some() {
            return Err(already());
        }

        let mut stored = record.clone();
        stored.version = 1;
        Self::stage_write(&txn, None, &stored)?;
        Self::commit(txn, already)?;
        Ok(stored.version)
    }

    async fn save_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError> {
        let key = Self::record_key(&record.user_id);
        let conflict = || {
            SwapshopError::ConcurrencyConflict(format!(
                "Score record for user {} changed during save",
                record.user_id
            ))
        };

        let txn = self.db.transaction();
        let existing = Self::read_for_update(&txn, &key)?.ok_or_else(|| {
            SwapshopError::NotFound(format!("Score record for user {}", record.user_id))
        })?;

        if existing.version != record.version {
            return Err(SwapshopError::ConcurrencyConflict(format!(
                "Score record for user {}: expected version {}, found {}",
                record.user_id, record.version, existing.version
            )));
        }

        let mut stored = record.clone();
        stored.version = existing.version + 1;
        Self::stage_write(&txn, Some(&existing), &stored)?;
        Self::commit(txn, conflict)?;
        Ok(stored.version)
    }

    async fn replace_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError> {
        let key = Self::record_key(&record.user_id);
        let conflict = || {
            SwapshopError::ConcurrencyConflict(format!(
                "Score record for user {} changed during replace",
                record.user_id
            ))
        };

        let txn = self.db.transaction();
        let existing = Self::read_for_update(&txn, &key)?.ok_or_else(|| {
            SwapshopError::NotFound(format!("Score record for user {}", record.user_id))
        })?;

        let mut stored = record.clone();
        stored.version = existing.version + 1;
        Self::stage_write(&txn, Some(&existing), &stored)?;
        Self::commit(txn, conflict)?;
        Ok(stored.version)
    }

    async fn list_records(&self) -> Result<Vec<ScoreRecord>, SwapshopError> {
        let prefix = RECORD_PREFIX.as_bytes();
        let mut records = Vec::new();

        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item
                .map_err(|e| SwapshopError::Storage(format!("RocksDB iteration error: {}", e)))?;
            if !key.starts_with(prefix) {
                break;
            }
            records.push(Self::decode(&value)?);
        }

        Ok(records)
    }

    async fn top_records(&self, limit: usize) -> Result<Vec<ScoreRecord>, SwapshopError> {
        let mut records = Vec::with_capacity(limit);
        if limit == 0 {
            return Ok(records);
        }

        self.scan_score_index(|_score, user_id| {
            if let Some(record) = self.get_record_sync(&user_id)? {
                records.push(record);
            }
            Ok(records.len() < limit)
        })?;

        Ok(records)
    }

    async fn records_in_range(&self, min: u16, max: u16) -> Result<Vec<ScoreRecord>, SwapshopError> {
        let mut records = Vec::new();

        self.scan_score_index(|score, user_id| {
            // Descending walk: skip above the range, stop once below it.
            if score < min {
                return Ok(false);
            }
            if score < max {
                if let Some(record) = self.get_record_sync(&user_id)? {
                    records.push(record);
                }
            }
            Ok(true)
        })?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use swapshop_core::{EventKind, EventRefs};

    fn temp_db_path(label: &str) -> String {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("swapshop_test_{}_{}", label, Uuid::now_v7()));
        path.to_string_lossy().to_string()
    }

    fn record_with(impact: i32) -> ScoreRecord {
        let mut r = ScoreRecord::new(Uuid::now_v7(), Utc::now());
        if impact != 0 {
            r.append_event(
                EventKind::ManualAdjustment,
                Some(impact),
                EventRefs::default(),
                "seed",
                None,
                Utc::now(),
            );
        }
        r
    }

    #[test]
    fn test_score_key_inverts_order() {
        let id = Uuid::nil();
        let high = RocksScoreStore::score_key(900, &id);
        let low = RocksScoreStore::score_key(300, &id);
        assert!(high < low);
        assert_eq!(
            String::from_utf8(RocksScoreStore::score_key(650, &id)).unwrap(),
            format!("score:250:{}", id)
        );
        assert_eq!(RocksScoreStore::parse_score_key(&high), Some((900, id)));
        assert_eq!(RocksScoreStore::parse_score_key(&low), Some((300, id)));
        assert_eq!(RocksScoreStore::parse_score_key(b"record:xyz"), None);
    }

    #[tokio::test]
    async fn test_create_is_unique() {
        let store = RocksScoreStore::open(&temp_db_path("unique")).unwrap();
        let record = record_with(0);

        assert_eq!(store.create_record(&record).await.unwrap(), 1);
        let err = store.create_record(&record).await.unwrap_err();
        assert!(matches!(err, SwapshopError::AlreadyExists(_)));

        let loaded = store.get_record(&record.user_id).await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn test_save_checks_version() {
        let store = RocksScoreStore::open(&temp_db_path("version")).unwrap();
        let mut record = record_with(0);
        record.version = store.create_record(&record).await.unwrap();

        let mut stale = record.clone();
        record.append_event(
            EventKind::LateReturn,
            None,
            EventRefs::default(),
            "late",
            None,
            Utc::now(),
        );
        record.version = store.save_record(&record).await.unwrap();
        assert_eq!(record.version, 2);

        stale.append_event(
            EventKind::FulfilledRequest,
            None,
            EventRefs::default(),
            "helped",
            None,
            Utc::now(),
        );
        let err = store.save_record(&stale).await.unwrap_err();
        assert!(matches!(err, SwapshopError::ConcurrencyConflict(_)));

        let loaded = store.get_record(&record.user_id).await.unwrap().unwrap();
        assert_eq!(loaded.events().len(), 1);
        assert_eq!(loaded.events()[0].kind, EventKind::LateReturn);
    }

    #[tokio::test]
    async fn test_save_and_replace_missing_record() {
        let store = RocksScoreStore::open(&temp_db_path("missing")).unwrap();
        let record = record_with(0);
        assert!(matches!(
            store.save_record(&record).await.unwrap_err(),
            SwapshopError::NotFound(_)
        ));
        assert!(matches!(
            store.replace_record(&record).await.unwrap_err(),
            SwapshopError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_index_follows_score_changes() {
        let store = RocksScoreStore::open(&temp_db_path("index")).unwrap();
        let mut a = record_with(0); // 650
        let b = record_with(200); // first positive: 230 -> 650 + 92 = 742
        let c = record_with(-200); // 570
        a.version = store.create_record(&a).await.unwrap();
        store.create_record(&b).await.unwrap();
        store.create_record(&c).await.unwrap();

        let top: Vec<u16> = store
            .top_records(10)
            .await
            .unwrap()
            .iter()
            .map(|r| r.current_score())
            .collect();
        assert_eq!(top, vec![742, 650, 570]);

        // Move `a` to the top; its old index entry must be gone.
        a.append_event(
            EventKind::ManualAdjustment,
            Some(400),
            EventRefs::default(),
            "boost",
            None,
            Utc::now(),
        );
        store.save_record(&a).await.unwrap();

        let top = store.top_records(10).await.unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].user_id, a.user_id);
        assert_eq!(store.top_records(1).await.unwrap().len(), 1);
        assert!(store.top_records(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_records_in_range_and_list() {
        let store = RocksScoreStore::open(&temp_db_path("range")).unwrap();
        for impact in [0, 200, -200, -500] {
            store.create_record(&record_with(impact)).await.unwrap();
        }
        // scores: 650, 742, 570, 450
        let fair = store.records_in_range(600, 720).await.unwrap();
        assert_eq!(fair.len(), 1);
        assert_eq!(fair[0].current_score(), 650);

        let risky = store.records_in_range(450, 600).await.unwrap();
        let scores: Vec<u16> = risky.iter().map(|r| r.current_score()).collect();
        assert_eq!(scores, vec![570, 450]);

        assert_eq!(store.list_records().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_replace_bumps_version() {
        let store = RocksScoreStore::open(&temp_db_path("replace")).unwrap();
        let mut record = record_with(-200);
        record.version = store.create_record(&record).await.unwrap();
        record.version = store.save_record(&record).await.unwrap();
        assert_eq!(record.version, 2);

        let fresh = ScoreRecord::new(record.user_id, Utc::now());
        assert_eq!(store.replace_record(&fresh).await.unwrap(), 3);

        let loaded = store.get_record(&record.user_id).await.unwrap().unwrap();
        assert_eq!(loaded.current_score(), 650);
        assert!(loaded.events().is_empty());
        assert_eq!(store.records_in_range(300, 901).await.unwrap().len(), 1);
    }
}
