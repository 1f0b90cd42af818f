//! Ingredient service
//!
//! Read access to the global ingredient catalog with optional
//! name-prefix search.

use anyhow::Result;
use std::sync::Arc;

use crate::db::repositories::IngredientRepository;
use crate::models::Ingredient;

/// Ingredient service for the ingredient catalog
pub struct IngredientService {
    ingredient_repo: Arc<dyn IngredientRepository>,
}

impl IngredientService {
    /// Create a new ingredient service
    pub fn new(ingredient_repo: Arc<dyn IngredientRepository>) -> Self {
        Self { ingredient_repo }
    }

    /// Get an ingredient by id
    pub async fn get(&self, id: i64) -> Result<Option<Ingredient>> {
        self.ingredient_repo.get_by_id(id).await
    }

    /// List ingredients, optionally restricted to a name prefix
    pub async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>> {
        self.ingredient_repo.list(name_prefix).await
    }
}
