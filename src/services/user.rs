//! User service
//!
//! Implements business logic for user management:
//! - Registration with Argon2 password hashing
//! - Token login and logout backed by database sessions
//! - Subscription listings with each author's recipes attached

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::repositories::{
    RecipeRepository, RelationRepository, SessionRepository, UserRepository,
};
use crate::models::{
    CreateUserInput, ListParams, PagedResult, Recipe, RelationKind, Session, User,
};
use crate::services::password::{hash_password, verify_password};

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials or token)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Email or username already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// User not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// A subscribed-to author with a slice of their recipes
#[derive(Debug, Clone)]
pub struct UserWithRecipes {
    pub user: User,
    pub recipes: Vec<Recipe>,
    pub recipes_count: i64,
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    relation_repo: Arc<dyn RelationRepository>,
    recipe_repo: Arc<dyn RecipeRepository>,
    session_lifetime_hours: i64,
}

impl UserService {
    /// Create a new user service
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        relation_repo: Arc<dyn RelationRepository>,
        recipe_repo: Arc<dyn RecipeRepository>,
        session_lifetime_hours: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            relation_repo,
            recipe_repo,
            session_lifetime_hours,
        }
    }

    /// Register a new user.
    ///
    /// Email and username must both be free; the password is stored only
    /// as an Argon2 hash.
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        validate_registration(&input)?;

        if self.user_repo.get_by_email(&input.email).await?.is_some() {
            return Err(UserServiceError::Conflict(format!(
                "Email {} is already registered",
                input.email
            )));
        }
        if self
            .user_repo
            .get_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(UserServiceError::Conflict(format!(
                "Username {} is already taken",
                input.username
            )));
        }

        let password_hash =
            hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(
            input.email,
            input.username,
            input.first_name,
            input.last_name,
            password_hash,
        );

        let created = self.user_repo.create(&user).await?;
        tracing::info!(user_id = created.id, "User registered");
        Ok(created)
    }

    /// Log in with email and password, returning a fresh session.
    ///
    /// Invalid email and invalid password produce the same error so the
    /// response does not reveal which accounts exist.
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let user = self
            .user_repo
            .get_by_email(&input.email)
            .await?
            .ok_or_else(|| {
                UserServiceError::Authentication("Invalid email or password".to_string())
            })?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            return Err(UserServiceError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: Utc::now() + Duration::hours(self.session_lifetime_hours),
            created_at: Utc::now(),
        };
        self.session_repo.create(&session).await?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(session)
    }

    /// Invalidate the session behind the token
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo.delete(token).await?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are deleted on sight and rejected.
    pub async fn authenticate(&self, token: &str) -> Result<User, UserServiceError> {
        let session = self.session_repo.get(token).await?.ok_or_else(|| {
            UserServiceError::Authentication("Invalid session token".to_string())
        })?;

        if session.is_expired() {
            self.session_repo.delete(token).await?;
            return Err(UserServiceError::Authentication(
                "Session expired".to_string(),
            ));
        }

        self.user_repo
            .get_by_id(session.user_id)
            .await?
            .ok_or_else(|| UserServiceError::Authentication("Invalid session token".to_string()))
    }

    /// Get a user by id
    pub async fn get(&self, id: i64) -> Result<User, UserServiceError> {
        self.user_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(format!("User {} not found", id)))
    }

    /// A page of users, in registration order
    pub async fn list(&self, params: &ListParams) -> Result<PagedResult<User>> {
        self.user_repo.list(params).await
    }

    /// Authors the user subscribes to, each with their recipe count and
    /// their newest recipes, optionally truncated to `recipes_limit`.
    pub async fn subscriptions(
        &self,
        user_id: i64,
        recipes_limit: Option<i64>,
    ) -> Result<Vec<UserWithRecipes>> {
        let author_ids = self
            .relation_repo
            .objects_for(RelationKind::Subscription, user_id)
            .await?;
        let authors = self.user_repo.get_by_ids(&author_ids).await?;

        let mut result = Vec::with_capacity(authors.len());
        for author in authors {
            let recipes = self.recipe_repo.by_author(author.id, recipes_limit).await?;
            let recipes_count = self.recipe_repo.count_by_author(author.id).await?;
            result.push(UserWithRecipes {
                user: author,
                recipes,
                recipes_count,
            });
        }
        Ok(result)
    }
}

fn validate_registration(input: &CreateUserInput) -> Result<(), UserServiceError> {
    if input.email.trim().is_empty() || !input.email.contains('@') {
        return Err(UserServiceError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    if input.username.trim().is_empty() {
        return Err(UserServiceError::Validation(
            "Username cannot be empty".to_string(),
        ));
    }
    if input.password.len() < 8 {
        return Err(UserServiceError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxRecipeRepository, SqlxRelationRepository, SqlxSessionRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, UserService) {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxRelationRepository::boxed(pool.clone()),
            SqlxRecipeRepository::boxed(pool.clone()),
            24,
        );
        (pool, service)
    }

    fn registration(email: &str, username: &str) -> CreateUserInput {
        CreateUserInput {
            email: email.to_string(),
            username: username.to_string(),
            first_name: "Julia".to_string(),
            last_name: "Child".to_string(),
            password: "butter and thyme".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let (_pool, service) = setup().await;

        let user = service
            .register(registration("cook@example.com", "cook"))
            .await
            .unwrap();
        assert!(user.id > 0);
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (_pool, service) = setup().await;

        service
            .register(registration("cook@example.com", "cook"))
            .await
            .unwrap();
        let err = service
            .register(registration("cook@example.com", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let (_pool, service) = setup().await;

        service
            .register(registration("cook@example.com", "cook"))
            .await
            .unwrap();
        let err = service
            .register(registration("other@example.com", "cook"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (_pool, service) = setup().await;

        let mut input = registration("not-an-email", "cook");
        let err = service.register(input.clone()).await.unwrap_err();
        assert!(matches!(err, UserServiceError::Validation(_)));

        input = registration("cook@example.com", "cook");
        input.password = "short".to_string();
        let err = service.register(input).await.unwrap_err();
        assert!(matches!(err, UserServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let (_pool, service) = setup().await;

        let user = service
            .register(registration("cook@example.com", "cook"))
            .await
            .unwrap();

        let session = service
            .login(LoginInput {
                email: "cook@example.com".to_string(),
                password: "butter and thyme".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.user_id, user.id);

        let authenticated = service.authenticate(&session.id).await.unwrap();
        assert_eq!(authenticated.id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (_pool, service) = setup().await;

        service
            .register(registration("cook@example.com", "cook"))
            .await
            .unwrap();

        let err = service
            .login(LoginInput {
                email: "cook@example.com".to_string(),
                password: "margarine".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let (_pool, service) = setup().await;

        service
            .register(registration("cook@example.com", "cook"))
            .await
            .unwrap();
        let session = service
            .login(LoginInput {
                email: "cook@example.com".to_string(),
                password: "butter and thyme".to_string(),
            })
            .await
            .unwrap();

        service.logout(&session.id).await.unwrap();
        let err = service.authenticate(&session.id).await.unwrap_err();
        assert!(matches!(err, UserServiceError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let (pool, service) = setup().await;

        service
            .register(registration("cook@example.com", "cook"))
            .await
            .unwrap();

        // Insert a session that expired an hour ago
        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at, created_at) VALUES ('stale', 1, ?, ?)",
        )
        .bind(Utc::now() - Duration::hours(1))
        .bind(Utc::now() - Duration::hours(2))
        .execute(&pool)
        .await
        .unwrap();

        let err = service.authenticate("stale").await.unwrap_err();
        assert!(matches!(err, UserServiceError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_list_returns_page() {
        let (_pool, service) = setup().await;

        for i in 0..3 {
            service
                .register(registration(&format!("u{i}@example.com"), &format!("u{i}")))
                .await
                .unwrap();
        }

        let page = service.list(&ListParams::new(2, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].username, "u2");
    }

    #[tokio::test]
    async fn test_subscriptions_with_recipes() {
        let (pool, service) = setup().await;

        let reader = service
            .register(registration("reader@example.com", "reader"))
            .await
            .unwrap();
        let author = service
            .register(registration("author@example.com", "author"))
            .await
            .unwrap();

        for name in ["Soup", "Pie", "Stew"] {
            sqlx::query(
                "INSERT INTO recipes (author_id, name, image, text, cooking_time) VALUES (?, ?, '', '', 10)",
            )
            .bind(author.id)
            .bind(name)
            .execute(&pool)
            .await
            .unwrap();
        }
        sqlx::query(
            "INSERT INTO subscriptions (user_id, author_id, created_at) VALUES (?, ?, datetime('now'))",
        )
        .bind(reader.id)
        .bind(author.id)
        .execute(&pool)
        .await
        .unwrap();

        let subs = service.subscriptions(reader.id, Some(2)).await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].user.id, author.id);
        assert_eq!(subs[0].recipes.len(), 2);
        assert_eq!(subs[0].recipes_count, 3);
    }
}
