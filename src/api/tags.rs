//! Tag API endpoints
//!
//! Read-only access to the tag catalog:
//! - GET /api/tags - List all tags
//! - GET /api/tags/{id} - Get a single tag

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::TagResponse;
use crate::services::tag::TagServiceError;

/// Build the tag router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags))
        .route("/{id}", get(get_tag))
}

/// GET /api/tags
async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = state.tag_service.list().await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// GET /api/tags/{id}
async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TagResponse>, ApiError> {
    let tag = state.tag_service.get(id).await.map_err(|e| match e {
        TagServiceError::NotFound(msg) => ApiError::not_found(msg),
        other => ApiError::internal_error(other.to_string()),
    })?;
    Ok(Json(TagResponse::from(tag)))
}
