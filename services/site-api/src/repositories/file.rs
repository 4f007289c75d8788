//! Flat-file backend: one JSON array per record type under the data directory

use async_trait::async_trait;
use chrono::Utc;
use common::{StorageError, StorageResult, file_store::JsonFile};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{ContactRepository, SessionRepository};
use crate::models::{Contact, SessionRecord};

pub const SESSIONS_FILE: &str = "sessions.json";
pub const CONTACTS_FILE: &str = "contacts.json";

/// Session repository backed by `sessions.json`
#[derive(Clone)]
pub struct FileSessionRepository {
    file: Arc<JsonFile<SessionRecord>>,
}

impl FileSessionRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            file: Arc::new(JsonFile::new(data_dir.join(SESSIONS_FILE))),
        }
    }
}

#[async_trait]
impl SessionRepository for FileSessionRepository {
    async fn save(&self, record: &SessionRecord) -> StorageResult<()> {
        self.file
            .update(|records| {
                if records.iter().any(|r| r.token == record.token) {
                    return Err(StorageError::Duplicate("session token".to_string()));
                }
                records.push(record.clone());
                Ok(())
            })
            .await
    }

    async fn find_all(&self) -> StorageResult<Vec<SessionRecord>> {
        self.file.read_all().await
    }

    async fn delete_by_token(&self, token: &str) -> StorageResult<()> {
        self.file
            .update(|records| {
                records.retain(|r| r.token != token);
                Ok(())
            })
            .await
    }

    async fn purge_expired(&self) -> StorageResult<u64> {
        let now = Utc::now();
        let removed = self
            .file
            .update(|records| {
                let before = records.len();
                records.retain(|r| !r.is_expired_at(now));
                Ok((before - records.len()) as u64)
            })
            .await?;

        if removed > 0 {
            info!("Purged {} expired sessions from {}", removed, SESSIONS_FILE);
        }
        Ok(removed)
    }
}

/// Contact repository backed by `contacts.json`
#[derive(Clone)]
pub struct FileContactRepository {
    file: Arc<JsonFile<Contact>>,
}

impl FileContactRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            file: Arc::new(JsonFile::new(data_dir.join(CONTACTS_FILE))),
        }
    }
}

#[async_trait]
impl ContactRepository for FileContactRepository {
    async fn insert(&self, contact: &Contact) -> StorageResult<()> {
        self.file
            .update(|contacts| {
                if contacts.iter().any(|c| c.id == contact.id) {
                    return Err(StorageError::Duplicate(format!("contact {}", contact.id)));
                }
                contacts.push(contact.clone());
                Ok(())
            })
            .await
    }

    async fn list_all(&self) -> StorageResult<Vec<Contact>> {
        let mut contacts = self.file.read_all().await?;
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contacts)
    }

    async fn delete_by_id(&self, id: Uuid) -> StorageResult<bool> {
        self.file
            .update(|contacts| {
                let before = contacts.len();
                contacts.retain(|c| c.id != id);
                Ok(contacts.len() < before)
            })
            .await
    }

    async fn set_attended(&self, id: Uuid, attended: bool) -> StorageResult<bool> {
        self.file
            .update(|contacts| match contacts.iter_mut().find(|c| c.id == id) {
                Some(contact) => {
                    contact.is_attended = attended;
                    Ok(true)
                }
                None => Ok(false),
            })
            .await
    }
}
