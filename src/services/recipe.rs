//! Recipe service
//!
//! Business logic for recipe management:
//! - Creation and update with full input validation
//! - Author-only modification and deletion
//! - Filtered, paginated listings

use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::repositories::{IngredientRepository, RecipeRepository, TagRepository};
use crate::models::{
    CreateRecipeInput, IngredientLine, IngredientLineInput, ListParams, PagedResult, Recipe,
    RecipeFilter, UpdateRecipeInput, MAX_AMOUNT, MAX_COOKING_TIME, MIN_AMOUNT, MIN_COOKING_TIME,
};

/// Error types for recipe service operations
#[derive(Debug, thiserror::Error)]
pub enum RecipeServiceError {
    /// Recipe or a referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requester is not the recipe's author
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Recipe service for managing recipes
pub struct RecipeService {
    recipe_repo: Arc<dyn RecipeRepository>,
    tag_repo: Arc<dyn TagRepository>,
    ingredient_repo: Arc<dyn IngredientRepository>,
}

impl RecipeService {
    /// Create a new recipe service
    pub fn new(
        recipe_repo: Arc<dyn RecipeRepository>,
        tag_repo: Arc<dyn TagRepository>,
        ingredient_repo: Arc<dyn IngredientRepository>,
    ) -> Self {
        Self {
            recipe_repo,
            tag_repo,
            ingredient_repo,
        }
    }

    /// Create a new recipe for the given author.
    ///
    /// Validates the whole input before anything is persisted, so a
    /// rejected recipe leaves no partial rows behind.
    pub async fn create(
        &self,
        author_id: i64,
        input: CreateRecipeInput,
    ) -> Result<Recipe, RecipeServiceError> {
        validate_name(&input.name)?;
        validate_cooking_time(input.cooking_time)?;
        validate_lines(&input.ingredients)?;
        validate_tag_ids(&input.tags)?;
        self.check_tags_exist(&input.tags).await?;
        self.check_ingredients_exist(&input.ingredients).await?;

        let recipe = Recipe::new(
            author_id,
            input.name,
            input.image,
            input.text,
            input.cooking_time,
        );

        let created = self
            .recipe_repo
            .create(&recipe, &input.tags, &input.ingredients)
            .await?;
        Ok(created)
    }

    /// Update a recipe. Only the author may update; when the ingredient
    /// or tag set is present it replaces the stored set wholesale.
    pub async fn update(
        &self,
        recipe_id: i64,
        requester_id: i64,
        input: UpdateRecipeInput,
    ) -> Result<Recipe, RecipeServiceError> {
        let mut recipe = self
            .recipe_repo
            .get_by_id(recipe_id)
            .await?
            .ok_or_else(|| RecipeServiceError::NotFound(format!("Recipe {} not found", recipe_id)))?;

        if recipe.author_id != requester_id {
            return Err(RecipeServiceError::Forbidden(
                "Only the author can update a recipe".to_string(),
            ));
        }

        if let Some(name) = input.name {
            validate_name(&name)?;
            recipe.name = name;
        }
        if let Some(image) = input.image {
            recipe.image = image;
        }
        if let Some(text) = input.text {
            recipe.text = text;
        }
        if let Some(cooking_time) = input.cooking_time {
            validate_cooking_time(cooking_time)?;
            recipe.cooking_time = cooking_time;
        }

        if let Some(ref lines) = input.ingredients {
            validate_lines(lines)?;
            self.check_ingredients_exist(lines).await?;
        }
        if let Some(ref tags) = input.tags {
            validate_tag_ids(tags)?;
            self.check_tags_exist(tags).await?;
        }

        self.recipe_repo
            .update(&recipe, input.tags.as_deref(), input.ingredients.as_deref())
            .await?;

        Ok(recipe)
    }

    /// Delete a recipe. Only the author may delete.
    pub async fn delete(
        &self,
        recipe_id: i64,
        requester_id: i64,
    ) -> Result<(), RecipeServiceError> {
        let recipe = self
            .recipe_repo
            .get_by_id(recipe_id)
            .await?
            .ok_or_else(|| RecipeServiceError::NotFound(format!("Recipe {} not found", recipe_id)))?;

        if recipe.author_id != requester_id {
            return Err(RecipeServiceError::Forbidden(
                "Only the author can delete a recipe".to_string(),
            ));
        }

        self.recipe_repo.delete(recipe_id).await?;
        Ok(())
    }

    /// Get a recipe by id
    pub async fn get(&self, recipe_id: i64) -> Result<Recipe, RecipeServiceError> {
        self.recipe_repo
            .get_by_id(recipe_id)
            .await?
            .ok_or_else(|| RecipeServiceError::NotFound(format!("Recipe {} not found", recipe_id)))
    }

    /// Filtered, paginated listing.
    ///
    /// An anonymous requester combined with a requester-scoped filter
    /// (favorites or cart) yields an empty page.
    pub async fn list(
        &self,
        filter: &RecipeFilter,
        requester: Option<i64>,
        params: &ListParams,
    ) -> Result<PagedResult<Recipe>> {
        self.recipe_repo.list(filter, requester, params).await
    }

    /// Ingredient lines for a recipe, joined with the catalog
    pub async fn lines_for(&self, recipe_id: i64) -> Result<Vec<IngredientLine>> {
        self.recipe_repo.lines_for(recipe_id).await
    }

    /// Recipes by an author, newest first, optionally truncated
    pub async fn by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>> {
        self.recipe_repo.by_author(author_id, limit).await
    }

    /// Number of recipes an author has published
    pub async fn count_by_author(&self, author_id: i64) -> Result<i64> {
        self.recipe_repo.count_by_author(author_id).await
    }

    async fn check_tags_exist(&self, tag_ids: &[i64]) -> Result<(), RecipeServiceError> {
        let found = self.tag_repo.get_by_ids(tag_ids).await?;
        if found.len() != tag_ids.len() {
            let known: HashSet<i64> = found.iter().map(|t| t.id).collect();
            let missing: Vec<String> = tag_ids
                .iter()
                .filter(|id| !known.contains(id))
                .map(|id| id.to_string())
                .collect();
            return Err(RecipeServiceError::NotFound(format!(
                "Unknown tag ids: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    async fn check_ingredients_exist(
        &self,
        lines: &[IngredientLineInput],
    ) -> Result<(), RecipeServiceError> {
        let ids: Vec<i64> = lines.iter().map(|l| l.id).collect();
        let found = self.ingredient_repo.get_by_ids(&ids).await?;
        if found.len() != ids.len() {
            let known: HashSet<i64> = found.iter().map(|i| i.id).collect();
            let missing: Vec<String> = ids
                .iter()
                .filter(|id| !known.contains(id))
                .map(|id| id.to_string())
                .collect();
            return Err(RecipeServiceError::NotFound(format!(
                "Unknown ingredient ids: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), RecipeServiceError> {
    if name.trim().is_empty() {
        return Err(RecipeServiceError::Validation(
            "Recipe name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_cooking_time(cooking_time: i64) -> Result<(), RecipeServiceError> {
    if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&cooking_time) {
        return Err(RecipeServiceError::Validation(format!(
            "Cooking time must be between {} and {} minutes",
            MIN_COOKING_TIME, MAX_COOKING_TIME
        )));
    }
    Ok(())
}

/// Validate the submitted ingredient lines: at least one line, no
/// duplicate ingredient ids, every amount within bounds.
fn validate_lines(lines: &[IngredientLineInput]) -> Result<(), RecipeServiceError> {
    if lines.is_empty() {
        return Err(RecipeServiceError::Validation(
            "A recipe needs at least one ingredient".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for line in lines {
        if !seen.insert(line.id) {
            return Err(RecipeServiceError::Validation(format!(
                "Duplicate ingredient id {}",
                line.id
            )));
        }
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&line.amount) {
            return Err(RecipeServiceError::Validation(format!(
                "Ingredient amount must be between {} and {}",
                MIN_AMOUNT, MAX_AMOUNT
            )));
        }
    }
    Ok(())
}

fn validate_tag_ids(tag_ids: &[i64]) -> Result<(), RecipeServiceError> {
    if tag_ids.is_empty() {
        return Err(RecipeServiceError::Validation(
            "A recipe needs at least one tag".to_string(),
        ));
    }

    let unique: HashSet<i64> = tag_ids.iter().copied().collect();
    if unique.len() != tag_ids.len() {
        return Err(RecipeServiceError::Validation(
            "Duplicate tag ids".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxIngredientRepository, SqlxRecipeRepository, SqlxTagRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Ingredient, Tag};
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, RecipeService) {
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

        let tag_repo = SqlxTagRepository::new(pool.clone());
        tag_repo
            .create(&Tag::new(
                "Breakfast".to_string(),
                "#FFAA00".to_string(),
                "breakfast".to_string(),
            ))
            .await
            .expect("Failed to create tag");

        let ingredient_repo = SqlxIngredientRepository::new(pool.clone());
        for (name, unit) in [("flour", "g"), ("milk", "ml")] {
            ingredient_repo
                .create(&Ingredient::new(name.to_string(), unit.to_string()))
                .await
                .expect("Failed to create ingredient");
        }

        let service = RecipeService::new(
            SqlxRecipeRepository::boxed(pool.clone()),
            SqlxTagRepository::boxed(pool.clone()),
            SqlxIngredientRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    fn valid_input() -> CreateRecipeInput {
        CreateRecipeInput {
            name: "Pancakes".to_string(),
            image: "pancakes.png".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
            ingredients: vec![
                IngredientLineInput { id: 1, amount: 200 },
                IngredientLineInput { id: 2, amount: 300 },
            ],
            tags: vec![1],
        }
    }

    #[tokio::test]
    async fn test_create_valid_recipe() {
        let (_pool, service) = setup().await;

        let recipe = service.create(1, valid_input()).await.unwrap();
        assert!(recipe.id > 0);
        assert_eq!(recipe.author_id, 1);

        let lines = service.lines_for(recipe.id).await.unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_ingredients() {
        let (_pool, service) = setup().await;

        let mut input = valid_input();
        input.ingredients.clear();
        let err = service.create(1, input).await.unwrap_err();
        assert!(matches!(err, RecipeServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_tags() {
        let (_pool, service) = setup().await;

        let mut input = valid_input();
        input.tags.clear();
        let err = service.create(1, input).await.unwrap_err();
        assert!(matches!(err, RecipeServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_ingredient() {
        let (_pool, service) = setup().await;

        let mut input = valid_input();
        input.ingredients = vec![
            IngredientLineInput { id: 1, amount: 100 },
            IngredientLineInput { id: 1, amount: 200 },
        ];
        let err = service.create(1, input).await.unwrap_err();
        assert!(matches!(err, RecipeServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range() {
        let (_pool, service) = setup().await;

        let mut input = valid_input();
        input.cooking_time = 0;
        let err = service.create(1, input).await.unwrap_err();
        assert!(matches!(err, RecipeServiceError::Validation(_)));

        let mut input = valid_input();
        input.ingredients[0].amount = 32001;
        let err = service.create(1, input).await.unwrap_err();
        assert!(matches!(err, RecipeServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_references() {
        let (_pool, service) = setup().await;

        let mut input = valid_input();
        input.tags = vec![999];
        let err = service.create(1, input).await.unwrap_err();
        assert!(matches!(err, RecipeServiceError::NotFound(_)));

        let mut input = valid_input();
        input.ingredients[0].id = 999;
        let err = service.create(1, input).await.unwrap_err();
        assert!(matches!(err, RecipeServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_author_only() {
        let (_pool, service) = setup().await;

        let recipe = service.create(1, valid_input()).await.unwrap();

        let err = service
            .update(
                recipe.id,
                2,
                UpdateRecipeInput {
                    name: Some("Stolen".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RecipeServiceError::Forbidden(_)));

        let updated = service
            .update(
                recipe.id,
                1,
                UpdateRecipeInput {
                    name: Some("Better Pancakes".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Better Pancakes");
    }

    #[tokio::test]
    async fn test_update_replaces_ingredient_set() {
        let (_pool, service) = setup().await;

        let recipe = service.create(1, valid_input()).await.unwrap();
        service
            .update(
                recipe.id,
                1,
                UpdateRecipeInput {
                    ingredients: Some(vec![IngredientLineInput { id: 2, amount: 50 }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let lines = service.lines_for(recipe.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].ingredient_id, 2);
        assert_eq!(lines[0].amount, 50);
    }

    #[tokio::test]
    async fn test_delete_author_only() {
        let (_pool, service) = setup().await;

        let recipe = service.create(1, valid_input()).await.unwrap();

        let err = service.delete(recipe.id, 2).await.unwrap_err();
        assert!(matches!(err, RecipeServiceError::Forbidden(_)));

        service.delete(recipe.id, 1).await.unwrap();
        let err = service.get(recipe.id).await.unwrap_err();
        assert!(matches!(err, RecipeServiceError::NotFound(_)));
    }
}
