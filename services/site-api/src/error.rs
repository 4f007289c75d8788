//! Custom error types for the site API

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::StorageError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the site API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Submitted data failed validation
    #[error("{0}")]
    Validation(String),

    /// Request body had the wrong shape
    #[error("{0}")]
    BadRequest(String),

    /// Username or password did not match; deliberately does not say which
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No bearer token was presented
    #[error("Authentication required")]
    MissingToken,

    /// Token was malformed, tampered with, expired or revoked
    #[error("Invalid or expired session")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Persistence layer failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Token could not be signed
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::MissingToken | ApiError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Token(_) | ApiError::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            ApiError::Storage(e) => {
                error!("Storage failure: {}", e);
                "Internal server error".to_string()
            }
            ApiError::Token(e) => {
                error!("Token signing failure: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
