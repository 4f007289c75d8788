//! Redis-backed session records
//!
//! Each record is stored as JSON under `admin_session:<token>` with a TTL
//! equal to its remaining lifetime, so Redis expires sessions on its own.

use async_trait::async_trait;
use chrono::Utc;
use common::{StorageError, StorageResult, cache::RedisPool};
use tracing::warn;

use super::SessionRepository;
use crate::models::SessionRecord;

const KEY_PREFIX: &str = "admin_session:";

fn session_key(token: &str) -> String {
    format!("{}{}", KEY_PREFIX, token)
}

/// Session repository storing records in Redis
#[derive(Clone)]
pub struct RedisSessionRepository {
    redis_pool: RedisPool,
}

impl RedisSessionRepository {
    pub fn new(redis_pool: RedisPool) -> Self {
        Self { redis_pool }
    }
}

#[async_trait]
impl SessionRepository for RedisSessionRepository {
    async fn save(&self, record: &SessionRecord) -> StorageResult<()> {
        let remaining = (record.expires_at - Utc::now()).num_seconds();
        if remaining <= 0 {
            warn!("Skipping storage of an already expired session");
            return Ok(());
        }

        let value = serde_json::to_string(record)?;
        let created = self
            .redis_pool
            .set_nx_ex(&session_key(&record.token), &value, remaining as u64)
            .await?;

        if !created {
            return Err(StorageError::Duplicate("session token".to_string()));
        }
        Ok(())
    }

    async fn find_all(&self) -> StorageResult<Vec<SessionRecord>> {
        let keys = self
            .redis_pool
            .scan_keys(&format!("{}*", KEY_PREFIX))
            .await?;

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            // Keys can expire between SCAN and GET.
            if let Some(value) = self.redis_pool.get(&key).await? {
                records.push(serde_json::from_str(&value)?);
            }
        }
        Ok(records)
    }

    async fn find_by_token(&self, token: &str) -> StorageResult<Option<SessionRecord>> {
        match self.redis_pool.get(&session_key(token)).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    async fn delete_by_token(&self, token: &str) -> StorageResult<()> {
        self.redis_pool.delete(&session_key(token)).await?;
        Ok(())
    }

    async fn purge_expired(&self) -> StorageResult<u64> {
        // Redis drops keys when their TTL runs out.
        Ok(0)
    }
}
