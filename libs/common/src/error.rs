//! Custom error types for the common library
//!
//! Every persistence backend (PostgreSQL, Redis, flat JSON files) reports
//! failures through [`StorageError`], so callers never need to know which
//! backend was wired in.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Error returned by the Redis server or client
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Error reading or writing a data file
    #[error("File storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record with the same unique key already exists
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Configuration error
    #[error("Storage configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Classify a query failure, surfacing unique-key violations as [`StorageError::Duplicate`]
    pub fn from_query(err: SqlxError) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                StorageError::Duplicate(db_err.message().to_string())
            }
            _ => StorageError::Query(err),
        }
    }
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_is_query_error() {
        let err = StorageError::from_query(SqlxError::RowNotFound);
        assert!(matches!(err, StorageError::Query(_)));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StorageError = io.into();
        assert!(err.to_string().starts_with("File storage error"));
    }
}
