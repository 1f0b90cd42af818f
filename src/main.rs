//! Ladle - A recipe sharing platform backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ladle::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxIngredientRepository, SqlxRecipeRepository, SqlxRelationRepository,
            SqlxSessionRepository, SqlxTagRepository, SqlxUserRepository,
        },
    },
    services::{
        IngredientService, RecipeService, ShoppingListService, TagService, ToggleService,
        UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ladle=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ladle recipe platform...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let ingredient_repo = SqlxIngredientRepository::boxed(pool.clone());
    let recipe_repo = SqlxRecipeRepository::boxed(pool.clone());
    let relation_repo = SqlxRelationRepository::boxed(pool.clone());

    // Services
    let user_service = Arc::new(UserService::new(
        user_repo.clone(),
        session_repo,
        relation_repo.clone(),
        recipe_repo.clone(),
        config.session.lifetime_hours,
    ));
    let recipe_service = Arc::new(RecipeService::new(
        recipe_repo.clone(),
        tag_repo.clone(),
        ingredient_repo.clone(),
    ));
    let tag_service = Arc::new(TagService::new(tag_repo));
    let ingredient_service = Arc::new(IngredientService::new(ingredient_repo));
    let toggle_service = Arc::new(ToggleService::new(
        relation_repo,
        recipe_repo.clone(),
        user_repo,
    ));
    let shopping_list_service = Arc::new(ShoppingListService::new(recipe_repo));

    let state = AppState {
        user_service,
        recipe_service,
        tag_service,
        ingredient_service,
        toggle_service,
        shopping_list_service,
    };

    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
