//! Contact store
//!
//! Validates and persists contact-form submissions. Performs no
//! authentication; admin operations reach it only through the gate.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{Contact, NewContact},
    repositories::ContactRepository,
    validation::normalize_contact,
};

#[derive(Clone)]
pub struct ContactStore {
    repository: Arc<dyn ContactRepository>,
}

impl ContactStore {
    pub fn new(repository: Arc<dyn ContactRepository>) -> Self {
        Self { repository }
    }

    /// Validate, stamp and persist a new entry
    pub async fn create(&self, input: NewContact) -> ApiResult<Contact> {
        let input = normalize_contact(input).map_err(ApiError::Validation)?;

        let contact = Contact {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            name: input.name,
            email: input.email,
            subject: input.subject,
            message: input.message,
            created_at: input.created_at.unwrap_or_else(Utc::now),
            user_agent: input.user_agent,
            ip_address: input.ip_address,
            is_attended: false,
        };

        self.repository.insert(&contact).await?;
        info!("Stored contact submission {}", contact.id);
        Ok(contact)
    }

    /// Every entry, newest first
    pub async fn list_all(&self) -> ApiResult<Vec<Contact>> {
        Ok(self.repository.list_all().await?)
    }

    /// Delete by id; `false` for unknown or malformed ids
    pub async fn delete_by_id(&self, id: &str) -> ApiResult<bool> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(false);
        };
        let deleted = self.repository.delete_by_id(id).await?;
        if deleted {
            info!("Deleted contact {}", id);
        }
        Ok(deleted)
    }

    /// Update the attended flag; `false` for unknown or malformed ids
    pub async fn set_attended(&self, id: &str, attended: bool) -> ApiResult<bool> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(false);
        };
        Ok(self.repository.set_attended(id, attended).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::FileContactRepository;
    use chrono::Duration;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ContactStore {
        ContactStore::new(Arc::new(FileContactRepository::new(dir.path())))
    }

    fn input(name: &str) -> NewContact {
        NewContact {
            name: name.into(),
            email: "a@b.com".into(),
            subject: "S".into(),
            message: "M".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_timestamp_and_flag() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let before = Utc::now();
        let created = store.create(input("A")).await.unwrap();
        let after = Utc::now();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], created);
        assert!(!created.is_attended);
        assert!(!created.id.is_nil());
        assert!(created.created_at >= before && created.created_at <= after);
    }

    #[tokio::test]
    async fn test_create_keeps_preset_id_and_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let id = Uuid::new_v4();
        let at = Utc::now() - Duration::days(2);

        let created = store
            .create(NewContact {
                id: Some(id),
                created_at: Some(at),
                ..input("A")
            })
            .await
            .unwrap();

        assert_eq!(created.id, id);
        assert_eq!(created.created_at, at);
    }

    #[tokio::test]
    async fn test_invalid_email_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let result = store
            .create(NewContact {
                email: "not-an-email".into(),
                ..input("A")
            })
            .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let t1 = Utc::now() - Duration::hours(3);
        let t2 = t1 + Duration::hours(1);
        let t3 = t2 + Duration::hours(1);

        for (name, at) in [("one", t1), ("three", t3), ("two", t2)] {
            store
                .create(NewContact {
                    created_at: Some(at),
                    ..input(name)
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["three", "two", "one"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.create(input("A")).await.unwrap();

        assert!(!store.delete_by_id(&Uuid::new_v4().to_string()).await.unwrap());
        assert!(!store.delete_by_id("not-a-uuid").await.unwrap());
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_attended_toggle_touches_only_the_flag() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let original = store
            .create(NewContact {
                user_agent: Some("Mozilla/5.0".into()),
                ..input("A")
            })
            .await
            .unwrap();
        let id = original.id.to_string();

        assert!(store.set_attended(&id, true).await.unwrap());
        assert!(store.list_all().await.unwrap()[0].is_attended);
        assert!(store.set_attended(&id, false).await.unwrap());

        assert_eq!(store.list_all().await.unwrap()[0], original);
        assert!(!store.set_attended("missing", true).await.unwrap());
    }
}
