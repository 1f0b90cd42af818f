//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the Ladle recipe
//! platform:
//! - Auth endpoints (token login/logout)
//! - User and subscription endpoints
//! - Tag and ingredient catalog endpoints
//! - Recipe endpoints with favorite/cart toggles and the shopping
//!   list download

pub mod auth;
pub mod ingredients;
pub mod middleware;
pub mod recipes;
pub mod responses;
pub mod tags;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser, RequireUser};

/// Build the main API router.
///
/// Session resolution runs for every request; handlers decide whether
/// a user is required through the `RequireUser` extractor.
pub fn build_api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/tags", tags::router())
        .nest("/ingredients", ingredients::router())
        .nest("/recipes", recipes::router())
        .layer(axum_middleware::from_fn_with_state(
            state,
            middleware::resolve_session,
        ))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    if let Ok(origin) = cors_origin.parse::<HeaderValue>() {
        cors = cors.allow_origin(origin);
    }

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
