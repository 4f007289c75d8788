//! Admin session management
//!
//! [`SessionManager`] is the only component that checks admin credentials
//! and mints, validates or revokes session tokens. A token is valid only
//! when its signature and embedded expiry check out *and* a matching,
//! unexpired session record is still stored; deleting the record revokes it.

use anyhow::{Context, Result};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    config::{AdminConfig, DEFAULT_ADMIN_PASSWORD},
    error::{ApiError, ApiResult},
    jwt::{IssuedToken, TokenCodec},
    models::SessionRecord,
    repositories::SessionRepository,
};

/// The configured administrator: a username and an argon2 password hash
pub struct AdminIdentity {
    username: String,
    password_hash: String,
}

impl AdminIdentity {
    /// Build from a PHC-format hash, rejecting strings that are not one
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Result<Self> {
        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid admin password hash: {}", e))?;

        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    /// Resolve the configured identity, hashing a plaintext password if that is all we have
    pub fn from_config(config: &AdminConfig) -> Result<Self> {
        if let Some(hash) = &config.password_hash {
            return Self::new(&config.username, hash);
        }

        let password = config.password.as_deref().unwrap_or(DEFAULT_ADMIN_PASSWORD);
        let hash = hash_password(password)?;
        Self::new(&config.username, hash)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check a credential pair
    ///
    /// The password hash is always verified, even for an unknown username,
    /// so both failure modes cost the same.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let password_ok = match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        };
        username_ok & password_ok
    }
}

/// Hash a password into an argon2 PHC string with a fresh salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Session authority for the single admin account
#[derive(Clone)]
pub struct SessionManager {
    codec: TokenCodec,
    repository: Arc<dyn SessionRepository>,
    admin: Arc<AdminIdentity>,
}

impl SessionManager {
    /// Create a session manager from the admin configuration
    pub fn new(config: &AdminConfig, repository: Arc<dyn SessionRepository>) -> Result<Self> {
        let admin = AdminIdentity::from_config(config).context("Failed to load admin identity")?;
        Ok(Self::with_identity(admin, &config.jwt_secret, repository))
    }

    pub fn with_identity(
        admin: AdminIdentity,
        jwt_secret: &str,
        repository: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            codec: TokenCodec::new(jwt_secret, admin.username()),
            repository,
            admin: Arc::new(admin),
        }
    }

    /// Check credentials and open a new session
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<IssuedToken> {
        let admin = self.admin.clone();
        let (username, password) = (username.to_string(), password.to_string());
        let verified = tokio::task::spawn_blocking(move || admin.verify(&username, &password))
            .await
            .map_err(|e| {
                error!("Credential check task failed: {}", e);
                ApiError::InternalServerError
            })?;

        if !verified {
            warn!("Rejected admin login attempt");
            return Err(ApiError::InvalidCredentials);
        }

        let issued = self.codec.issue()?;
        let record = SessionRecord {
            token: issued.token.clone(),
            username: self.admin.username().to_string(),
            created_at: issued.issued_at,
            expires_at: issued.expires_at,
        };
        self.repository.save(&record).await?;

        info!("Admin session created, expires at {}", issued.expires_at);
        Ok(issued)
    }

    /// Whether `token` currently grants admin access
    ///
    /// Storage failures count as invalid.
    pub async fn validate(&self, token: &str) -> bool {
        if token.is_empty() || !self.codec.verify(token) {
            return false;
        }

        match self.repository.find_by_token(token).await {
            Ok(Some(record)) => !record.is_expired_at(Utc::now()),
            Ok(None) => false,
            Err(e) => {
                error!("Session lookup failed, treating token as invalid: {}", e);
                false
            }
        }
    }

    /// Revoke a session; unknown tokens and storage failures are not reported
    pub async fn logout(&self, token: &str) {
        match self.repository.delete_by_token(token).await {
            Ok(()) => info!("Admin session closed"),
            Err(e) => error!("Failed to delete admin session: {}", e),
        }
    }

    /// Drop stored sessions whose expiry has passed
    pub async fn purge_expired(&self) -> common::StorageResult<u64> {
        self.repository.purge_expired().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::jwt::SESSION_TTL_HOURS;
    use crate::repositories::FileSessionRepository;
    use argon2::{Algorithm, Params, Version};
    use async_trait::async_trait;
    use chrono::Duration;
    use common::{StorageError, StorageResult};
    use tempfile::TempDir;

    pub(crate) const TEST_SECRET: &str = "session-test-secret";

    /// Low-cost argon2 hash so tests stay fast
    pub(crate) fn cheap_hash(password: &str) -> String {
        let params = Params::new(1024, 1, 1, None).unwrap();
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut rand::thread_rng());
        argon2
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    fn manager(dir: &TempDir) -> (SessionManager, Arc<FileSessionRepository>) {
        let repo = Arc::new(FileSessionRepository::new(dir.path()));
        let admin = AdminIdentity::new("admin", cheap_hash("correct horse")).unwrap();
        let manager = SessionManager::with_identity(admin, TEST_SECRET, repo.clone());
        (manager, repo)
    }

    struct UnreachableStore;

    #[async_trait]
    impl SessionRepository for UnreachableStore {
        async fn save(&self, _: &SessionRecord) -> StorageResult<()> {
            Err(StorageError::Configuration("unreachable".into()))
        }
        async fn find_all(&self) -> StorageResult<Vec<SessionRecord>> {
            Err(StorageError::Configuration("unreachable".into()))
        }
        async fn delete_by_token(&self, _: &str) -> StorageResult<()> {
            Err(StorageError::Configuration("unreachable".into()))
        }
        async fn purge_expired(&self) -> StorageResult<u64> {
            Err(StorageError::Configuration("unreachable".into()))
        }
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"admin", b"admin"));
        assert!(!constant_time_eq(b"admin", b"admim"));
        assert!(!constant_time_eq(b"admin", b"admin2"));
    }

    #[test]
    fn test_identity_rejects_non_phc_hash() {
        assert!(AdminIdentity::new("admin", "plaintext-password").is_err());
    }

    #[test]
    fn test_identity_verify() {
        let admin = AdminIdentity::new("admin", cheap_hash("pw")).unwrap();
        assert!(admin.verify("admin", "pw"));
        assert!(!admin.verify("admin", "wrong"));
        assert!(!admin.verify("someone", "pw"));
    }

    #[test]
    fn test_identity_from_plaintext_config_hashes_it() {
        let config = AdminConfig {
            username: "owner".into(),
            password_hash: None,
            password: Some("pw-from-env".into()),
            jwt_secret: TEST_SECRET.into(),
        };
        let admin = AdminIdentity::from_config(&config).unwrap();
        assert!(admin.password_hash.starts_with("$argon2"));
        assert!(admin.verify("owner", "pw-from-env"));
    }

    #[tokio::test]
    async fn test_login_then_validate() {
        let dir = TempDir::new().unwrap();
        let (manager, repo) = manager(&dir);

        let issued = manager.login("admin", "correct horse").await.unwrap();
        assert!(manager.validate(&issued.token).await);

        let stored = repo.find_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].username, "admin");
        assert_eq!(stored[0].expires_at, issued.expires_at);
    }

    #[tokio::test]
    async fn test_concurrent_sessions_are_independent() {
        let dir = TempDir::new().unwrap();
        let (manager, repo) = manager(&dir);

        let first = manager.login("admin", "correct horse").await.unwrap();
        let second = manager.login("admin", "correct horse").await.unwrap();
        assert_eq!(repo.find_all().await.unwrap().len(), 2);

        manager.logout(&first.token).await;
        assert!(!manager.validate(&first.token).await);
        assert!(manager.validate(&second.token).await);
    }

    #[tokio::test]
    async fn test_wrong_credentials_create_no_session() {
        let dir = TempDir::new().unwrap();
        let (manager, repo) = manager(&dir);

        let wrong_password = manager.login("admin", "wrong").await;
        let wrong_user = manager.login("root", "correct horse").await;

        assert!(matches!(wrong_password, Err(ApiError::InvalidCredentials)));
        assert!(matches!(wrong_user, Err(ApiError::InvalidCredentials)));
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logout_revokes_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let (manager, _) = manager(&dir);

        let issued = manager.login("admin", "correct horse").await.unwrap();
        manager.logout(&issued.token).await;
        manager.logout(&issued.token).await;
        manager.logout("never-issued").await;

        assert!(!manager.validate(&issued.token).await);
    }

    #[tokio::test]
    async fn test_embedded_expiry_is_enforced() {
        let dir = TempDir::new().unwrap();
        let (manager, repo) = manager(&dir);

        let issued = TokenCodec::new(TEST_SECRET, "admin")
            .issue_at(Utc::now() - Duration::hours(SESSION_TTL_HOURS + 1))
            .unwrap();
        // Record still looks live; the signed expiry alone must reject it.
        repo.save(&SessionRecord {
            token: issued.token.clone(),
            username: "admin".into(),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::hours(1),
        })
        .await
        .unwrap();

        assert!(!manager.validate(&issued.token).await);
    }

    #[tokio::test]
    async fn test_expired_record_is_invalid() {
        let dir = TempDir::new().unwrap();
        let (manager, repo) = manager(&dir);

        let issued = TokenCodec::new(TEST_SECRET, "admin").issue().unwrap();
        repo.save(&SessionRecord {
            token: issued.token.clone(),
            username: "admin".into(),
            created_at: Utc::now() - Duration::hours(2),
            expires_at: Utc::now() - Duration::seconds(1),
        })
        .await
        .unwrap();

        assert!(!manager.validate(&issued.token).await);
        assert_eq!(manager.purge_expired().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_signed_but_unstored_token_is_invalid() {
        let dir = TempDir::new().unwrap();
        let (manager, _) = manager(&dir);

        let issued = TokenCodec::new(TEST_SECRET, "admin").issue().unwrap();
        assert!(!manager.validate(&issued.token).await);
        assert!(!manager.validate("garbage").await);
        assert!(!manager.validate("").await);
    }

    #[tokio::test]
    async fn test_storage_failure_fails_closed() {
        let admin = AdminIdentity::new("admin", cheap_hash("pw")).unwrap();
        let manager = SessionManager::with_identity(admin, TEST_SECRET, Arc::new(UnreachableStore));

        let issued = TokenCodec::new(TEST_SECRET, "admin").issue().unwrap();
        assert!(!manager.validate(&issued.token).await);

        let login = manager.login("admin", "pw").await;
        assert!(matches!(login, Err(ApiError::Storage(_))));

        manager.logout(&issued.token).await;
    }
}
