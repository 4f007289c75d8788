//! Persistence interfaces for sessions and contacts
//!
//! The session authority and the contact store only see these traits; the
//! concrete backend is chosen once at startup (see [`crate::state`]).

use async_trait::async_trait;
use common::StorageResult;
use uuid::Uuid;

use crate::models::{Contact, SessionRecord};

pub mod file;
pub mod postgres;
pub mod redis;

pub use file::{FileContactRepository, FileSessionRepository};
pub use postgres::{PgContactRepository, PgSessionRepository};
pub use redis::RedisSessionRepository;

/// Storage for admin session records
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a record; fails with `StorageError::Duplicate` if the token exists
    async fn save(&self, record: &SessionRecord) -> StorageResult<()>;

    /// Every stored record, expired ones included
    async fn find_all(&self) -> StorageResult<Vec<SessionRecord>>;

    /// Look up a single record by token
    async fn find_by_token(&self, token: &str) -> StorageResult<Option<SessionRecord>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .find(|record| record.token == token))
    }

    /// Remove the record for `token`; a missing token is not an error
    async fn delete_by_token(&self, token: &str) -> StorageResult<()>;

    /// Remove every expired record, returning how many were removed
    async fn purge_expired(&self) -> StorageResult<u64>;
}

/// Storage for contact-form entries
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Insert a fully formed entry
    async fn insert(&self, contact: &Contact) -> StorageResult<()>;

    /// All entries, newest `created_at` first
    async fn list_all(&self) -> StorageResult<Vec<Contact>>;

    /// Remove an entry, returning whether it existed
    async fn delete_by_id(&self, id: Uuid) -> StorageResult<bool>;

    /// Set the attended flag, returning whether the entry existed
    async fn set_attended(&self, id: Uuid, attended: bool) -> StorageResult<bool>;
}
