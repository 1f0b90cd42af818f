//! Recipe API endpoints
//!
//! Handles HTTP requests for recipes and their toggles:
//! - GET /api/recipes - Filtered, paginated listing
//! - POST /api/recipes - Create a recipe
//! - GET /api/recipes/{id} - Get a recipe
//! - PATCH /api/recipes/{id} - Update (author only)
//! - DELETE /api/recipes/{id} - Delete (author only)
//! - POST/DELETE /api/recipes/{id}/favorite - Favorite toggle
//! - POST/DELETE /api/recipes/{id}/shopping_cart - Cart toggle
//! - GET /api/recipes/download_shopping_cart - Aggregated list download

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, MaybeUser, RequireUser};
use crate::api::responses::{
    build_recipe_response, PagedResponse, RecipeResponse, RecipeShortResponse, RequesterContext,
};
use crate::models::{
    CreateRecipeInput, ListParams, RecipeFilter, RelationKind, UpdateRecipeInput,
};
use crate::services::SHOPPING_LIST_FILENAME;

/// Build the recipe router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/{id}",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/{id}/favorite", axum::routing::post(favorite).delete(unfavorite))
        .route(
            "/{id}/shopping_cart",
            axum::routing::post(add_to_cart).delete(remove_from_cart),
        )
}

/// Parsed recipe listing query.
///
/// `tags` may repeat; boolean filters accept `1`/`0` and `true`/`false`.
/// Unrecognized parameters and unparsable values are ignored.
struct RecipeListQuery {
    params: ListParams,
    filter: RecipeFilter,
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

fn parse_list_query(pairs: &[(String, String)]) -> RecipeListQuery {
    let mut page = 1u32;
    let mut limit = 10u32;
    let mut filter = RecipeFilter::default();

    for (key, value) in pairs {
        match key.as_str() {
            "page" => {
                if let Ok(p) = value.parse() {
                    page = p;
                }
            }
            "limit" => {
                if let Ok(l) = value.parse() {
                    limit = l;
                }
            }
            "author" => {
                if let Ok(a) = value.parse() {
                    filter.author = Some(a);
                }
            }
            "tags" => filter.tags.push(value.clone()),
            "is_favorited" => filter.is_favorited = parse_flag(value),
            "is_in_shopping_cart" => filter.is_in_shopping_cart = parse_flag(value),
            _ => {}
        }
    }

    RecipeListQuery {
        params: ListParams::new(page, limit),
        filter,
    }
}

/// GET /api/recipes
async fn list_recipes(
    State(state): State<AppState>,
    MaybeUser(requester): MaybeUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<PagedResponse<RecipeResponse>>, ApiError> {
    let requester_id = requester.map(|u| u.id);
    let query = parse_list_query(&pairs);

    let paged = state
        .recipe_service
        .list(&query.filter, requester_id, &query.params)
        .await?;

    let ctx = RequesterContext::load(&state, requester_id).await?;
    let mut results = Vec::with_capacity(paged.items.len());
    for recipe in &paged.items {
        results.push(build_recipe_response(&state, recipe.clone(), &ctx).await?);
    }

    Ok(Json(PagedResponse::new(paged, results)))
}

/// GET /api/recipes/{id}
async fn get_recipe(
    State(state): State<AppState>,
    MaybeUser(requester): MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let recipe = state.recipe_service.get(id).await?;
    let ctx = RequesterContext::load(&state, requester.map(|u| u.id)).await?;
    Ok(Json(build_recipe_response(&state, recipe, &ctx).await?))
}

/// POST /api/recipes
async fn create_recipe(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(input): Json<CreateRecipeInput>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = state.recipe_service.create(user.id, input).await?;
    let ctx = RequesterContext::load(&state, Some(user.id)).await?;
    let body = build_recipe_response(&state, recipe, &ctx).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// PATCH /api/recipes/{id}
async fn update_recipe(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateRecipeInput>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let recipe = state.recipe_service.update(id, user.id, input).await?;
    let ctx = RequesterContext::load(&state, Some(user.id)).await?;
    Ok(Json(build_recipe_response(&state, recipe, &ctx).await?))
}

/// DELETE /api/recipes/{id}
async fn delete_recipe(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.recipe_service.delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Shared body of the favorite and cart activation handlers
async fn activate_relation(
    state: &AppState,
    kind: RelationKind,
    user_id: i64,
    recipe_id: i64,
) -> Result<(StatusCode, Json<RecipeShortResponse>), ApiError> {
    state.toggle_service.activate(kind, user_id, recipe_id).await?;
    let recipe = state.recipe_service.get(recipe_id).await?;
    Ok((StatusCode::CREATED, Json(RecipeShortResponse::from(&recipe))))
}

/// POST /api/recipes/{id}/favorite
async fn favorite(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    activate_relation(&state, RelationKind::Favorite, user.id, id).await
}

/// DELETE /api/recipes/{id}/favorite
async fn unfavorite(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .toggle_service
        .deactivate(RelationKind::Favorite, user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/shopping_cart
async fn add_to_cart(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    activate_relation(&state, RelationKind::Cart, user.id, id).await
}

/// DELETE /api/recipes/{id}/shopping_cart
async fn remove_from_cart(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .toggle_service
        .deactivate(RelationKind::Cart, user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/recipes/download_shopping_cart
async fn download_shopping_cart(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    let document = state.shopping_list_service.render(user.id).await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", SHOPPING_LIST_FILENAME),
            ),
        ],
        document,
    ))
}
