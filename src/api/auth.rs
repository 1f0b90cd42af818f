//! Authentication API endpoints
//!
//! Handles HTTP requests for token authentication:
//! - POST /api/auth/token/login - Exchange credentials for a token
//! - POST /api/auth/token/logout - Invalidate the current token

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, RequireUser};
use crate::services::user::LoginInput;

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// Build the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token/login", post(login))
        .route("/token/logout", post(logout))
}

/// POST /api/auth/token/login
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.user_service.login(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            auth_token: session.id,
        }),
    ))
}

/// POST /api/auth/token/logout
async fn logout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Token ").or_else(|| v.strip_prefix("Bearer ")))
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state.user_service.logout(token).await?;
    tracing::info!(user_id = user.id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}
