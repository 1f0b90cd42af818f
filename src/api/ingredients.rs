//! Ingredient API endpoints
//!
//! Read-only access to the ingredient catalog:
//! - GET /api/ingredients - List, optionally filtered by name prefix
//! - GET /api/ingredients/{id} - Get a single ingredient

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::IngredientResponse;

/// Query parameters for ingredient search
#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

/// Build the ingredient router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ingredients))
        .route("/{id}", get(get_ingredient))
}

/// GET /api/ingredients
async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let ingredients = state
        .ingredient_service
        .list(query.name.as_deref())
        .await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

/// GET /api/ingredients/{id}
async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let ingredient = state
        .ingredient_service
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Ingredient {} not found", id)))?;
    Ok(Json(IngredientResponse::from(ingredient)))
}
