//! Tag service
//!
//! Business logic for the tag catalog: validated creation and lookups.
//! Tags are administered out of band, so the service exposes creation
//! for seeding and tests but the HTTP surface only reads.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::db::repositories::TagRepository;
use crate::models::Tag;

/// Hex color in `#RGB` or `#RRGGBB` form
static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("valid regex"));

/// URL-friendly slug characters
static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// Tag does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Name or slug already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Tag service for the tag catalog
pub struct TagService {
    tag_repo: Arc<dyn TagRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(tag_repo: Arc<dyn TagRepository>) -> Self {
        Self { tag_repo }
    }

    /// Create a new tag after validating color and slug
    pub async fn create(
        &self,
        name: String,
        color: String,
        slug: String,
    ) -> Result<Tag, TagServiceError> {
        if name.trim().is_empty() {
            return Err(TagServiceError::Validation(
                "Tag name cannot be empty".to_string(),
            ));
        }
        if !COLOR_RE.is_match(&color) {
            return Err(TagServiceError::Validation(format!(
                "Invalid hex color: {}",
                color
            )));
        }
        if !SLUG_RE.is_match(&slug) {
            return Err(TagServiceError::Validation(format!(
                "Invalid slug: {}",
                slug
            )));
        }

        if self.tag_repo.get_by_slug(&slug).await?.is_some() {
            return Err(TagServiceError::Conflict(format!(
                "Slug {} is already taken",
                slug
            )));
        }

        let created = self.tag_repo.create(&Tag::new(name, color, slug)).await?;
        Ok(created)
    }

    /// Get a tag by id
    pub async fn get(&self, id: i64) -> Result<Tag, TagServiceError> {
        self.tag_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| TagServiceError::NotFound(format!("Tag {} not found", id)))
    }

    /// All tags ordered by name
    pub async fn list(&self) -> Result<Vec<Tag>> {
        self.tag_repo.list().await
    }

    /// Tags attached to a recipe
    pub async fn for_recipe(&self, recipe_id: i64) -> Result<Vec<Tag>> {
        self.tag_repo.get_by_recipe_id(recipe_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxTagRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> TagService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        TagService::new(SqlxTagRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_valid_tag() {
        let service = setup().await;

        let tag = service
            .create(
                "Breakfast".to_string(),
                "#FFAA00".to_string(),
                "breakfast".to_string(),
            )
            .await
            .unwrap();
        assert!(tag.id > 0);

        let found = service.get(tag.id).await.unwrap();
        assert_eq!(found.slug, "breakfast");
    }

    #[tokio::test]
    async fn test_short_hex_color_accepted() {
        let service = setup().await;

        let tag = service
            .create("Lunch".to_string(), "#fa0".to_string(), "lunch".to_string())
            .await
            .unwrap();
        assert_eq!(tag.color, "#fa0");
    }

    #[tokio::test]
    async fn test_invalid_color_rejected() {
        let service = setup().await;

        for color in ["FFAA00", "#GGAA00", "#FFAA0", "#FFAA000"] {
            let err = service
                .create("Bad".to_string(), color.to_string(), "bad".to_string())
                .await
                .unwrap_err();
            assert!(matches!(err, TagServiceError::Validation(_)), "{}", color);
        }
    }

    #[tokio::test]
    async fn test_invalid_slug_rejected() {
        let service = setup().await;

        let err = service
            .create(
                "Bad".to_string(),
                "#FFAA00".to_string(),
                "not a slug".to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TagServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflict() {
        let service = setup().await;

        service
            .create(
                "Breakfast".to_string(),
                "#FFAA00".to_string(),
                "breakfast".to_string(),
            )
            .await
            .unwrap();
        let err = service
            .create(
                "Morning".to_string(),
                "#00AAFF".to_string(),
                "breakfast".to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TagServiceError::Conflict(_)));
    }
}
