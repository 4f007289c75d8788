//! Application state shared across handlers, and backend wiring

use anyhow::{Context, Result};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig},
};
use std::sync::Arc;
use tracing::info;

use crate::{
    config::{AppConfig, StorageBackend},
    contacts::ContactStore,
    repositories::{
        ContactRepository, FileContactRepository, FileSessionRepository, PgContactRepository,
        PgSessionRepository, RedisSessionRepository, SessionRepository, postgres,
    },
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session_manager: SessionManager,
    pub contact_store: ContactStore,
    /// Whether the admin cookie is marked `Secure`
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(session_manager: SessionManager, contact_store: ContactStore, cookie_secure: bool) -> Self {
        Self {
            session_manager,
            contact_store,
            cookie_secure,
        }
    }

    /// Wire repositories for the configured backend and build the state
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let (mut sessions, contacts): (Arc<dyn SessionRepository>, Arc<dyn ContactRepository>) =
            match config.storage.backend {
                StorageBackend::File => {
                    info!(
                        "Using file storage in {}",
                        config.storage.data_dir.display()
                    );
                    (
                        Arc::new(FileSessionRepository::new(&config.storage.data_dir)),
                        Arc::new(FileContactRepository::new(&config.storage.data_dir)),
                    )
                }
                StorageBackend::Postgres => {
                    let url = config
                        .storage
                        .database_url
                        .as_deref()
                        .context("storage.database_url is required for the postgres backend")?;
                    let pool = database::init_pool(&DatabaseConfig::new(
                        url,
                        config.storage.max_connections,
                    ))
                    .await?;

                    if !database::health_check(&pool).await? {
                        anyhow::bail!("Failed to connect to database");
                    }
                    postgres::run_migrations(&pool).await?;
                    info!("Using PostgreSQL storage");

                    (
                        Arc::new(PgSessionRepository::new(pool.clone())),
                        Arc::new(PgContactRepository::new(pool)),
                    )
                }
            };

        if let Some(redis_url) = &config.storage.redis_url {
            let redis_pool = RedisPool::new(&RedisConfig::new(redis_url.as_str())).await?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }
            info!("Storing admin sessions in Redis");
            sessions = Arc::new(RedisSessionRepository::new(redis_pool));
        }

        let session_manager = SessionManager::new(&config.admin, sessions)?;
        let contact_store = ContactStore::new(contacts);

        Ok(Self::new(
            session_manager,
            contact_store,
            config.server.cookie_secure,
        ))
    }
}
