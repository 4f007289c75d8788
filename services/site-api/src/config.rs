//! Service configuration
//!
//! Loaded once at process start from built-in defaults, an optional
//! `config/site-api.{toml,yaml,json}` file and `SITE_API__*` environment
//! variables (later sources win). The resulting [`AppConfig`] is passed into
//! constructors; nothing else in the service reads the environment.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Development admin username, used when none is configured
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Development admin password, used when neither a hash nor a password is configured
pub const DEFAULT_ADMIN_PASSWORD: &str = "change-me-admin";
/// Development token-signing secret
pub const DEFAULT_JWT_SECRET: &str = "development-secret-change-in-production";

const ENV_PREFIX: &str = "SITE_API";
const CONFIG_FILE: &str = "config/site-api";

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub storage: StorageConfig,
    pub sessions: SessionsConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Mark the admin session cookie `Secure`
    pub cookie_secure: bool,
}

/// The single administrator identity and the token-signing secret
#[derive(Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    /// Argon2 PHC string, e.g. produced by the `hash-password` binary
    #[serde(default)]
    pub password_hash: Option<String>,
    /// Plaintext fallback; hashed once at startup and never compared directly
    #[serde(default)]
    pub password: Option<String>,
    pub jwt_secret: String,
}

// Secrets stay out of debug output.
impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "<set>"))
            .field("password", &self.password.as_ref().map(|_| "<set>"))
            .field("jwt_secret", &"<set>")
            .finish()
    }
}

/// Which persistence backend holds contacts and sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON files under `data_dir`
    File,
    /// PostgreSQL at `database_url`
    Postgres,
}

/// Persistence settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory holding `contacts.json` and `sessions.json` for the file backend
    pub data_dir: PathBuf,
    #[serde(default)]
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// When set, session records live in Redis instead of the main backend
    #[serde(default)]
    pub redis_url: Option<String>,
}

/// Session housekeeping
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Cron expression (with seconds) for purging expired session records
    pub purge_schedule: String,
}

impl AppConfig {
    /// Load configuration from the default file location and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Some(CONFIG_FILE))
    }

    /// Load configuration, optionally layering the named file under the environment
    pub fn load_from(file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.bind_address", "0.0.0.0:3000")?
            .set_default("server.cookie_secure", false)?
            .set_default("admin.username", DEFAULT_ADMIN_USERNAME)?
            .set_default("admin.jwt_secret", DEFAULT_JWT_SECRET)?
            .set_default("storage.backend", "file")?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.max_connections", 5_i64)?
            .set_default("sessions.purge_schedule", "0 */15 * * * *")?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Names of settings still running on development defaults
    pub fn development_defaults(&self) -> Vec<&'static str> {
        let mut defaults = Vec::new();
        if self.admin.username == DEFAULT_ADMIN_USERNAME {
            defaults.push("admin.username");
        }
        if self.admin.password_hash.is_none()
            && self
                .admin
                .password
                .as_deref()
                .is_none_or(|p| p == DEFAULT_ADMIN_PASSWORD)
        {
            defaults.push("admin.password");
        }
        if self.admin.jwt_secret == DEFAULT_JWT_SECRET {
            defaults.push("admin.jwt_secret");
        }
        defaults
    }
}
