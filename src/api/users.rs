//! User API endpoints
//!
//! Handles HTTP requests for users and subscriptions:
//! - POST /api/users - Register
//! - GET /api/users - List users
//! - GET /api/users/me - Current user
//! - GET /api/users/{id} - Get a user
//! - GET /api/users/subscriptions - Subscribed-to authors with recipes
//! - POST /api/users/{id}/subscribe - Subscribe to an author
//! - DELETE /api/users/{id}/subscribe - Unsubscribe

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, MaybeUser, RequireUser};
use crate::api::responses::{
    PagedResponse, RequesterContext, SubscriptionResponse, UserResponse,
};
use crate::models::{CreateUserInput, ListParams, PagedResult, RelationKind};
use crate::services::user::UserWithRecipes;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.limit.unwrap_or(10))
    }
}

/// Query parameters for subscription listings
#[derive(Debug, Deserialize)]
pub struct SubscriptionQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub recipes_limit: Option<i64>,
}

/// Build the user router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register).get(list_users))
        .route("/me", get(current_user))
        .route("/subscriptions", get(list_subscriptions))
        .route("/{id}", get(get_user))
        .route("/{id}/subscribe", post(subscribe).delete(unsubscribe))
}

/// POST /api/users
async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.register(input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::new(user, false))))
}

/// GET /api/users
async fn list_users(
    State(state): State<AppState>,
    MaybeUser(requester): MaybeUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResponse<UserResponse>>, ApiError> {
    let ctx = RequesterContext::load(&state, requester.map(|u| u.id)).await?;

    let params = query.params();
    let paged = state.user_service.list(&params).await?;
    let results: Vec<UserResponse> = paged
        .items
        .iter()
        .map(|u| {
            let is_subscribed = ctx.is_subscribed(u.id);
            UserResponse::new(u.clone(), is_subscribed)
        })
        .collect();

    Ok(Json(PagedResponse::new(paged, results)))
}

/// GET /api/users/me
async fn current_user(RequireUser(user): RequireUser) -> Json<UserResponse> {
    // A user never subscribes to themselves
    Json(UserResponse::new(user, false))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<AppState>,
    MaybeUser(requester): MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get(id).await?;

    let is_subscribed = match requester {
        Some(r) => {
            state
                .toggle_service
                .is_active(RelationKind::Subscription, r.id, id)
                .await?
        }
        None => false,
    };
    Ok(Json(UserResponse::new(user, is_subscribed)))
}

/// GET /api/users/subscriptions
async fn list_subscriptions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Json<PagedResponse<SubscriptionResponse>>, ApiError> {
    let entries = state
        .user_service
        .subscriptions(user.id, query.recipes_limit)
        .await?;

    let params = ListParams::new(query.page.unwrap_or(1), query.limit.unwrap_or(10));
    let total = entries.len() as i64;
    let page: Vec<SubscriptionResponse> = entries
        .into_iter()
        .skip(params.offset() as usize)
        .take(params.limit() as usize)
        .map(SubscriptionResponse::new)
        .collect();

    let paged: PagedResult<()> = PagedResult::new(Vec::new(), total, &params);
    Ok(Json(PagedResponse::new(paged, page)))
}

/// POST /api/users/{id}/subscribe
async fn subscribe(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .toggle_service
        .activate(RelationKind::Subscription, user.id, id)
        .await?;

    let author = state.user_service.get(id).await?;
    let recipes = state
        .recipe_service
        .by_author(id, query.recipes_limit)
        .await?;
    let recipes_count = state.recipe_service.count_by_author(id).await?;

    let body = SubscriptionResponse::new(UserWithRecipes {
        user: author,
        recipes,
        recipes_count,
    });
    Ok((StatusCode::CREATED, Json(body)))
}

/// DELETE /api/users/{id}/subscribe
async fn unsubscribe(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .toggle_service
        .deactivate(RelationKind::Subscription, user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
