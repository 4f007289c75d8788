//! Site API routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::UserAgent,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    AppState,
    error::ApiError,
    middleware::{ADMIN_TOKEN_COOKIE, auth_middleware, extract_token},
    models::{ApiResponse, AttendedUpdate, ContactSubmission, LoginResponse, NewContact},
    validation::validate_login,
};

/// Request for admin login
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Request for admin logout
#[derive(Deserialize, Default)]
pub struct LogoutRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Create the router for the site API
pub fn create_router(state: AppState) -> Router {
    // The gate covers only the routes registered before `route_layer`.
    let admin_routes = Router::new()
        .route("/contacts", get(list_contacts))
        .route("/contacts/:id", delete(delete_contact))
        .route("/contacts/:id/attended", patch(update_attended))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route("/login", post(login))
        .route("/logout", post(logout));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/contact", post(submit_contact))
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "site-api"
    }))
}

/// First hop of X-Forwarded-For, else X-Real-IP
fn client_address(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Public contact form submission
pub async fn submit_contact(
    State(state): State<AppState>,
    user_agent: Option<TypedHeader<UserAgent>>,
    headers: HeaderMap,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let new_contact = NewContact::from_submission(
        submission,
        user_agent.map(|TypedHeader(ua)| ua.as_str().to_string()),
        client_address(&headers),
    );
    let contact = state.contact_store.create(new_contact).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::data(json!({ "id": contact.id }))
                .with_message("Contact form submitted successfully"),
        ),
    ))
}

/// Admin login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    validate_login(&request.username, &request.password).map_err(ApiError::BadRequest)?;

    let issued = state
        .session_manager
        .login(&request.username, &request.password)
        .await?;

    let cookie = Cookie::build((ADMIN_TOKEN_COOKIE, issued.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(state.cookie_secure);

    let response = LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token: issued.token,
        expires_at: issued.expires_at,
    };

    Ok((jar.add(cookie), Json(response)))
}

/// Admin logout endpoint; always succeeds
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let token = request
        .token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| extract_token(&headers));

    match token {
        Some(token) => state.session_manager.logout(&token).await,
        None => info!("Logout without a token"),
    }

    let jar = jar.remove(Cookie::build(ADMIN_TOKEN_COOKIE).path("/"));
    (jar, Json(ApiResponse::message("Logged out successfully")))
}

/// List contact submissions, newest first
pub async fn list_contacts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let contacts = state.contact_store.list_all().await?;
    Ok(Json(ApiResponse::data(contacts)))
}

/// Delete a contact submission
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.contact_store.delete_by_id(&id).await? {
        return Err(ApiError::NotFound("Contact not found".to_string()));
    }

    Ok(Json(ApiResponse::message("Contact deleted successfully")))
}

/// Mark a contact submission as attended or not
pub async fn update_attended(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AttendedUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(update) =
        payload.map_err(|_| ApiError::BadRequest("isAttended must be a boolean".to_string()))?;

    if !state
        .contact_store
        .set_attended(&id, update.is_attended)
        .await?
    {
        return Err(ApiError::NotFound("Contact not found".to_string()));
    }

    let message = if update.is_attended {
        "Contact marked as attended"
    } else {
        "Contact marked as not attended"
    };
    Ok(Json(
        ApiResponse::data(json!({ "isAttended": update.is_attended })).with_message(message),
    ))
}
