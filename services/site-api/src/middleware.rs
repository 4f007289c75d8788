//! Admin request gate
//!
//! Every admin contact operation passes through [`auth_middleware`], which
//! only checks that the presented token is a live session. It has no
//! per-route logic.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{error::ApiError, state::AppState};

/// Cookie carrying the admin token for browser clients
pub const ADMIN_TOKEN_COOKIE: &str = "adminToken";

/// Find the bearer token, preferring the Authorization header over the cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(ADMIN_TOKEN_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Reject the request unless it carries a valid admin session token
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers()).ok_or(ApiError::MissingToken)?;

    if !state.session_manager.validate(&token).await {
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}
