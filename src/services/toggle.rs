//! Toggle service
//!
//! One service for every on/off relation a user can hold: favoriting a
//! recipe, putting a recipe in the shopping cart, subscribing to an
//! author. Activation of an already-active pair is a conflict, and
//! deactivation of an inactive pair is a not-found. Both directions are
//! strict so clients always learn the true prior state.

use anyhow::Result;
use std::sync::Arc;

use crate::db::repositories::{RecipeRepository, RelationRepository, UserRepository};
use crate::models::{Relation, RelationKind};

/// Error types for toggle operations
#[derive(Debug, thiserror::Error)]
pub enum ToggleServiceError {
    /// The target object or the relation itself does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The relation is already active
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Service managing favorite, cart and subscription relations
pub struct ToggleService {
    relation_repo: Arc<dyn RelationRepository>,
    recipe_repo: Arc<dyn RecipeRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl ToggleService {
    /// Create a new toggle service
    pub fn new(
        relation_repo: Arc<dyn RelationRepository>,
        recipe_repo: Arc<dyn RecipeRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            relation_repo,
            recipe_repo,
            user_repo,
        }
    }

    /// Verify that the object of the relation exists
    async fn check_object(
        &self,
        kind: RelationKind,
        object_id: i64,
    ) -> Result<(), ToggleServiceError> {
        if kind.targets_recipe() {
            if self.recipe_repo.get_by_id(object_id).await?.is_none() {
                return Err(ToggleServiceError::NotFound(format!(
                    "Recipe {} not found",
                    object_id
                )));
            }
        } else if self.user_repo.get_by_id(object_id).await?.is_none() {
            return Err(ToggleServiceError::NotFound(format!(
                "User {} not found",
                object_id
            )));
        }
        Ok(())
    }

    /// Activate the (subject, object) relation.
    ///
    /// Fails with `Conflict` when the pair is already active, `NotFound`
    /// when the object does not exist, and `Validation` for a
    /// self-subscription. The unique index on the relation table decides
    /// the winner when two activations race.
    pub async fn activate(
        &self,
        kind: RelationKind,
        subject_id: i64,
        object_id: i64,
    ) -> Result<Relation, ToggleServiceError> {
        if kind == RelationKind::Subscription && subject_id == object_id {
            return Err(ToggleServiceError::Validation(
                "Cannot subscribe to yourself".to_string(),
            ));
        }

        self.check_object(kind, object_id).await?;

        match self.relation_repo.insert(kind, subject_id, object_id).await? {
            Some(relation) => Ok(relation),
            None => Err(ToggleServiceError::Conflict(format!(
                "{} already exists",
                kind
            ))),
        }
    }

    /// Deactivate the (subject, object) relation.
    ///
    /// Fails with `NotFound` when the pair is not active. Only the exact
    /// pair is removed.
    pub async fn deactivate(
        &self,
        kind: RelationKind,
        subject_id: i64,
        object_id: i64,
    ) -> Result<(), ToggleServiceError> {
        let removed = self.relation_repo.delete(kind, subject_id, object_id).await?;
        if removed == 0 {
            return Err(ToggleServiceError::NotFound(format!("{} not found", kind)));
        }
        Ok(())
    }

    /// Whether the (subject, object) relation is currently active
    pub async fn is_active(
        &self,
        kind: RelationKind,
        subject_id: i64,
        object_id: i64,
    ) -> Result<bool> {
        self.relation_repo.exists(kind, subject_id, object_id).await
    }

    /// All object ids the subject holds relations to, in activation order
    pub async fn active_objects(&self, kind: RelationKind, subject_id: i64) -> Result<Vec<i64>> {
        self.relation_repo.objects_for(kind, subject_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxRecipeRepository, SqlxRelationRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, ToggleService) {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        for (email, username) in [("a@example.com", "a"), ("b@example.com", "b")] {
            sqlx::query(
                "INSERT INTO users (email, username, first_name, last_name, password_hash) VALUES (?, ?, 'F', 'L', 'h')",
            )
            .bind(email)
            .bind(username)
            .execute(&pool)
            .await
            .expect("Failed to create user");
        }
        sqlx::query(
            "INSERT INTO recipes (author_id, name, image, text, cooking_time) VALUES (1, 'Soup', '', '', 10)",
        )
        .execute(&pool)
        .await
        .expect("Failed to create recipe");

        let service = ToggleService::new(
            SqlxRelationRepository::boxed(pool.clone()),
            SqlxRecipeRepository::boxed(pool.clone()),
            SqlxUserRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    #[tokio::test]
    async fn test_activate_then_conflict() {
        let (_pool, service) = setup().await;

        let relation = service
            .activate(RelationKind::Favorite, 1, 1)
            .await
            .expect("First activation should succeed");
        assert_eq!(relation.object_id, 1);

        let err = service
            .activate(RelationKind::Favorite, 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ToggleServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_activate_missing_recipe() {
        let (_pool, service) = setup().await;

        let err = service
            .activate(RelationKind::Cart, 1, 999)
            .await
            .unwrap_err();
        assert!(matches!(err, ToggleServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_deactivate_requires_active_pair() {
        let (_pool, service) = setup().await;

        let err = service
            .deactivate(RelationKind::Favorite, 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ToggleServiceError::NotFound(_)));

        service.activate(RelationKind::Favorite, 1, 1).await.unwrap();
        service
            .deactivate(RelationKind::Favorite, 1, 1)
            .await
            .expect("Deactivation of an active pair should succeed");
        assert!(!service.is_active(RelationKind::Favorite, 1, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_self_subscription_rejected() {
        let (_pool, service) = setup().await;

        let err = service
            .activate(RelationKind::Subscription, 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ToggleServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_subscribe_to_missing_user() {
        let (_pool, service) = setup().await;

        let err = service
            .activate(RelationKind::Subscription, 1, 999)
            .await
            .unwrap_err();
        assert!(matches!(err, ToggleServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_toggle_cycle() {
        let (_pool, service) = setup().await;

        // activate -> deactivate -> activate again works
        service.activate(RelationKind::Cart, 1, 1).await.unwrap();
        service.deactivate(RelationKind::Cart, 1, 1).await.unwrap();
        service.activate(RelationKind::Cart, 1, 1).await.unwrap();
        assert!(service.is_active(RelationKind::Cart, 1, 1).await.unwrap());
    }
}
