// crates/swapshop-store/src/projection.rs
//
// Stores for the denormalized trust fields mirrored onto user profiles.
//
// The projection is a cache: overwritten wholesale on every sync and never
// read back for scoring or eligibility decisions.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use swapshop_core::error::SwapshopError;
use swapshop_core::summary::{ProjectionUpdate, UserProjection};
use swapshop_core::traits::ProjectionSink;
use swapshop_core::UserId;

use crate::rocks::RocksScoreStore;

const PROFILE_PREFIX: &str = "profile:";

/// Projection store sharing the score database under `profile:{uuid}` keys.
#[derive(Debug, Clone)]
pub struct RocksProjectionStore {
    store: Arc<RocksScoreStore>,
}

impl RocksProjectionStore {
    pub fn new(store: Arc<RocksScoreStore>) -> Self {
        Self { store }
    }

    fn profile_key(user_id: &UserId) -> Vec<u8> {
        format!("{}{}", PROFILE_PREFIX, user_id).into_bytes()
    }
}

#[async_trait]
impl ProjectionSink for RocksProjectionStore {
    async fn update_summary(
        &self,
        user_id: &UserId,
        update: &ProjectionUpdate,
    ) -> Result<(), SwapshopError> {
        let projection = UserProjection {
            user_id: *user_id,
            fields: *update,
            last_synced_at: Utc::now(),
        };
        let json = serde_json::to_vec(&projection)?;
        self.store.put_bytes(&Self::profile_key(user_id), &json)
    }

    async fn get_projection(&self, user_id: &UserId) -> Result<Option<UserProjection>, SwapshopError> {
        match self.store.get_bytes(&Self::profile_key(user_id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

/// HashMap-backed projection store for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryProjectionStore {
    profiles: RwLock<HashMap<UserId, UserProjection>>,
}

impl InMemoryProjectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectionSink for InMemoryProjectionStore {
    async fn update_summary(
        &self,
        user_id: &UserId,
        update: &ProjectionUpdate,
    ) -> Result<(), SwapshopError> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|e| SwapshopError::ProjectionSync(format!("Lock poisoned: {}", e)))?;
        profiles.insert(
            *user_id,
            UserProjection {
                user_id: *user_id,
                fields: *update,
                last_synced_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_projection(&self, user_id: &UserId) -> Result<Option<UserProjection>, SwapshopError> {
        let profiles = self
            .profiles
            .read()
            .map_err(|e| SwapshopError::ProjectionSync(format!("Lock poisoned: {}", e)))?;
        Ok(profiles.get(user_id).cloned())
    }
}
