// crates/swapshop-store/src/memory.rs
//
// In-memory ScoreStore backed by a HashMap behind an RwLock.
//
// Each trait operation performs its check-and-set inside one write-lock
// scope, giving the same create-once and version-checked save semantics as
// the RocksDB backend. Suitable for tests and embedding; not durable.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use swapshop_core::error::SwapshopError;
use swapshop_core::record::ScoreRecord;
use swapshop_core::traits::ScoreStore;
use swapshop_core::UserId;

/// HashMap-backed `ScoreStore`.
#[derive(Debug, Default)]
pub struct InMemoryScoreStore {
    records: RwLock<HashMap<UserId, ScoreRecord>>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<UserId, ScoreRecord>>, SwapshopError> {
        self.records
            .read()
            .map_err(|e| SwapshopError::Storage(format!("Lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<UserId, ScoreRecord>>, SwapshopError> {
        self.records
            .write()
            .map_err(|e| SwapshopError::Storage(format!("Lock poisoned: {}", e)))
    }

    fn sorted_desc(mut records: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
        records.sort_by(|a, b| {
            b.current_score()
                .cmp(&a.current_score())
                .then(a.user_id.cmp(&b.user_id))
        });
        records
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn get_record(&self, user_id: &UserId) -> Result<Option<ScoreRecord>, SwapshopError> {
        Ok(self.read()?.get(user_id).cloned())
    }

    async fn create_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError> {
        let mut map = self.write()?;
        if map.contains_key(&record.user_id) {
            return Err(SwapshopError::AlreadyExists(format!(
                "Score record for user {}",
                record.user_id
            )));
        }
        let mut stored = record.clone();
        stored.version = 1;
        map.insert(stored.user_id, stored);
        Ok(1)
    }

    async fn save_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError> {
        let mut map = self.write()?;
        let existing = map.get(&record.user_id).ok_or_else(|| {
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
        let version = stored.version;
        map.insert(stored.user_id, stored);
        Ok(version)
    }

    async fn replace_record(&self, record: &ScoreRecord) -> Result<u64, SwapshopError> {
        let mut map = self.write()?;
        let existing = map.get(&record.user_id).ok_or_else(|| {
            SwapshopError::NotFound(format!("Score record for user {}", record.user_id))
        })?;

        let mut stored = record.clone();
        stored.version = existing.version + 1;
        let version = stored.version;
        map.insert(stored.user_id, stored);
        Ok(version)
    }

    async fn list_records(&self) -> Result<Vec<ScoreRecord>, SwapshopError> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn top_records(&self, limit: usize) -> Result<Vec<ScoreRecord>, SwapshopError> {
        let all = self.read()?.values().cloned().collect();
        let mut sorted = Self::sorted_desc(all);
        sorted.truncate(limit);
        Ok(sorted)
    }

    async fn records_in_range(&self, min: u16, max: u16) -> Result<Vec<ScoreRecord>, SwapshopError> {
        let matching = self
            .read()?
            .values()
            .filter(|r| r.current_score() >= min && r.current_score() < max)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(matching))
    }
}
