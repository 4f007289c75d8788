//! PostgreSQL backend for sessions and contacts

use async_trait::async_trait;
use common::{StorageError, StorageResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{ContactRepository, SessionRepository};
use crate::models::{Contact, SessionRecord};

/// Apply the bundled schema migrations
pub async fn run_migrations(pool: &PgPool) -> StorageResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StorageError::Migration(e.to_string()))?;
    info!("Database migrations applied");
    Ok(())
}

fn session_from_row(row: &PgRow) -> Result<SessionRecord, sqlx::Error> {
    Ok(SessionRecord {
        token: row.try_get("token")?,
        username: row.try_get("username")?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
    })
}

fn contact_from_row(row: &PgRow) -> Result<Contact, sqlx::Error> {
    Ok(Contact {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        subject: row.try_get("subject")?,
        message: row.try_get("message")?,
        created_at: row.try_get("created_at")?,
        user_agent: row.try_get("user_agent")?,
        ip_address: row.try_get("ip_address")?,
        is_attended: row.try_get("is_attended")?,
    })
}

/// Session repository for database operations
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn save(&self, record: &SessionRecord) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_sessions (token, username, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&record.token)
        .bind(&record.username)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_query)?;

        Ok(())
    }

    async fn find_all(&self) -> StorageResult<Vec<SessionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT token, username, created_at, expires_at
            FROM admin_sessions
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)?;

        rows.iter()
            .map(session_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::Query)
    }

    async fn find_by_token(&self, token: &str) -> StorageResult<Option<SessionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT token, username, created_at, expires_at
            FROM admin_sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Query)?;

        row.as_ref()
            .map(session_from_row)
            .transpose()
            .map_err(StorageError::Query)
    }

    async fn delete_by_token(&self, token: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM admin_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Query)?;

        Ok(())
    }

    async fn purge_expired(&self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(StorageError::Query)?;

        if result.rows_affected() > 0 {
            info!("Purged {} expired sessions", result.rows_affected());
        }
        Ok(result.rows_affected())
    }
}

/// Contact repository for database operations
#[derive(Clone)]
pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    /// Create a new contact repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn insert(&self, contact: &Contact) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contacts
                (id, name, email, subject, message, user_agent, ip_address, is_attended, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(contact.id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.subject)
        .bind(&contact.message)
        .bind(&contact.user_agent)
        .bind(&contact.ip_address)
        .bind(contact.is_attended)
        .bind(contact.created_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_query)?;

        Ok(())
    }

    async fn list_all(&self) -> StorageResult<Vec<Contact>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, subject, message, user_agent, ip_address, is_attended, created_at
            FROM contacts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)?;

        rows.iter()
            .map(contact_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::Query)
    }

    async fn delete_by_id(&self, id: Uuid) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_attended(&self, id: Uuid, attended: bool) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE contacts SET is_attended = $2 WHERE id = $1")
            .bind(id)
            .bind(attended)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
