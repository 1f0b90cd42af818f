//! Recipe repository
//!
//! Database operations for recipes, their tag associations and ingredient
//! lines, the filtered listing query and the shopping cart aggregation.
//!
//! Recipe creation and update run inside a transaction: the recipe row, its
//! tag set and its ingredient lines land together or not at all. On update
//! the tag set and line set are wholesale replaced (delete-then-recreate)
//! when new sets are supplied.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{
    IngredientLine, IngredientLineInput, ListParams, PagedResult, Recipe, RecipeFilter,
    ShoppingListEntry,
};

/// Recipe repository trait
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Create a recipe together with its tag set and ingredient lines
    async fn create(
        &self,
        recipe: &Recipe,
        tag_ids: &[i64],
        lines: &[IngredientLineInput],
    ) -> Result<Recipe>;

    /// Update a recipe's scalar fields; when `tag_ids` or `lines` are given
    /// the corresponding sets are replaced in the same transaction
    async fn update(
        &self,
        recipe: &Recipe,
        tag_ids: Option<&[i64]>,
        lines: Option<&[IngredientLineInput]>,
    ) -> Result<()>;

    /// Delete a recipe, returning the number of rows removed
    async fn delete(&self, id: i64) -> Result<u64>;

    /// Get recipe by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Recipe>>;

    /// Filtered, paginated listing ordered newest-first
    async fn list(
        &self,
        filter: &RecipeFilter,
        requester: Option<i64>,
        params: &ListParams,
    ) -> Result<PagedResult<Recipe>>;

    /// Ingredient lines for a recipe, joined with the catalog
    async fn lines_for(&self, recipe_id: i64) -> Result<Vec<IngredientLine>>;

    /// Recipes by an author, newest first, optionally truncated
    async fn by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>>;

    /// Number of recipes an author has published
    async fn count_by_author(&self, author_id: i64) -> Result<i64>;

    /// Aggregated shopping list for a user's cart: one entry per distinct
    /// ingredient with summed amounts, ordered by ingredient name
    async fn cart_summary(&self, user_id: i64) -> Result<Vec<ShoppingListEntry>>;
}

/// SQLx-based recipe repository implementation
pub struct SqlxRecipeRepository {
    pool: SqlitePool,
}

impl SqlxRecipeRepository {
    /// Create a new SQLx recipe repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn RecipeRepository> {
        Arc::new(Self::new(pool))
    }
}

/// Bind value for dynamically composed filter queries
enum BindValue {
    Int(i64),
    Text(String),
}

/// Translate a `RecipeFilter` plus requester identity into WHERE conditions
/// and their bind values. All conditions are ANDed; the tag condition ORs
/// its slugs via `IN`.
fn build_conditions(
    filter: &RecipeFilter,
    requester: Option<i64>,
) -> (Vec<String>, Vec<BindValue>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(author) = filter.author {
        conditions.push("r.author_id = ?".to_string());
        binds.push(BindValue::Int(author));
    }

    if !filter.tags.is_empty() {
        let placeholders = vec!["?"; filter.tags.len()].join(", ");
        conditions.push(format!(
            "r.id IN (SELECT rt.recipe_id FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id WHERE t.slug IN ({}))",
            placeholders
        ));
        for slug in &filter.tags {
            binds.push(BindValue::Text(slug.clone()));
        }
    }

    // Requester presence is checked by the caller; these arms only run for
    // authenticated listings
    if let (Some(value), Some(user)) = (filter.is_favorited, requester) {
        let op = if value { "IN" } else { "NOT IN" };
        conditions.push(format!(
            "r.id {} (SELECT recipe_id FROM favorites WHERE user_id = ?)",
            op
        ));
        binds.push(BindValue::Int(user));
    }

    if let (Some(value), Some(user)) = (filter.is_in_shopping_cart, requester) {
        let op = if value { "IN" } else { "NOT IN" };
        conditions.push(format!(
            "r.id {} (SELECT recipe_id FROM cart_entries WHERE user_id = ?)",
            op
        ));
        binds.push(BindValue::Int(user));
    }

    (conditions, binds)
}

#[async_trait]
impl RecipeRepository for SqlxRecipeRepository {
    async fn create(
        &self,
        recipe: &Recipe,
        tag_ids: &[i64],
        lines: &[IngredientLineInput],
    ) -> Result<Recipe> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let result = sqlx::query(
            r#"
            INSERT INTO recipes (author_id, name, image, text, cooking_time, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(recipe.author_id)
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to create recipe")?;

        let id = result.last_insert_rowid();

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
                .bind(id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("Failed to attach tag")?;
        }

        for line in lines {
            sqlx::query(
                "INSERT INTO ingredient_lines (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
            )
            .bind(id)
            .bind(line.id)
            .bind(line.amount)
            .execute(&mut *tx)
            .await
            .context("Failed to attach ingredient line")?;
        }

        tx.commit().await.context("Failed to commit recipe")?;

        Ok(Recipe {
            id,
            author_id: recipe.author_id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            text: recipe.text.clone(),
            cooking_time: recipe.cooking_time,
            created_at: now,
        })
    }

    async fn update(
        &self,
        recipe: &Recipe,
        tag_ids: Option<&[i64]>,
        lines: Option<&[IngredientLineInput]>,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query(
            "UPDATE recipes SET name = ?, image = ?, text = ?, cooking_time = ? WHERE id = ?",
        )
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(recipe.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update recipe")?;

        if let Some(tag_ids) = tag_ids {
            sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
                .bind(recipe.id)
                .execute(&mut *tx)
                .await
                .context("Failed to clear tags")?;

            for tag_id in tag_ids {
                sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
                    .bind(recipe.id)
                    .bind(tag_id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to attach tag")?;
            }
        }

        if let Some(lines) = lines {
            // Wholesale replacement; the transaction keeps the previous set
            // intact if any insert fails
            sqlx::query("DELETE FROM ingredient_lines WHERE recipe_id = ?")
                .bind(recipe.id)
                .execute(&mut *tx)
                .await
                .context("Failed to clear ingredient lines")?;

            for line in lines {
                sqlx::query(
                    "INSERT INTO ingredient_lines (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
                )
                .bind(recipe.id)
                .bind(line.id)
                .bind(line.amount)
                .execute(&mut *tx)
                .await
                .context("Failed to attach ingredient line")?;
            }
        }

        tx.commit().await.context("Failed to commit recipe update")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete recipe")?;
        Ok(result.rows_affected())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Recipe>> {
        let row = sqlx::query(
            "SELECT id, author_id, name, image, text, cooking_time, created_at FROM recipes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get recipe by ID")?;

        Ok(row.map(|r| row_to_recipe(&r)))
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        requester: Option<i64>,
        params: &ListParams,
    ) -> Result<PagedResult<Recipe>> {
        // Requester-scoped filters with an anonymous requester force an
        // empty listing, not an error
        if filter.needs_requester() && requester.is_none() {
            return Ok(PagedResult::empty(params));
        }

        let (conditions, binds) = build_conditions(filter, requester);
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) as count FROM recipes r{}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        for bind in &binds {
            count_query = match bind {
                BindValue::Int(v) => count_query.bind(v),
                BindValue::Text(v) => count_query.bind(v),
            };
        }
        let total: i64 = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count recipes")?
            .get("count");

        let list_sql = format!(
            "SELECT r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.created_at \
             FROM recipes r{} ORDER BY r.created_at DESC, r.id DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql);
        for bind in &binds {
            list_query = match bind {
                BindValue::Int(v) => list_query.bind(v),
                BindValue::Text(v) => list_query.bind(v),
            };
        }
        let rows = list_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list recipes")?;

        let items = rows.iter().map(row_to_recipe).collect();
        Ok(PagedResult::new(items, total, params))
    }

    async fn lines_for(&self, recipe_id: i64) -> Result<Vec<IngredientLine>> {
        let rows = sqlx::query(
            r#"
            SELECT il.ingredient_id, i.name, i.measurement_unit, il.amount
            FROM ingredient_lines il
            JOIN ingredients i ON i.id = il.ingredient_id
            WHERE il.recipe_id = ?
            ORDER BY il.id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get ingredient lines")?;

        Ok(rows
            .iter()
            .map(|r| IngredientLine {
                ingredient_id: r.get("ingredient_id"),
                name: r.get("name"),
                measurement_unit: r.get("measurement_unit"),
                amount: r.get("amount"),
            })
            .collect())
    }

    async fn by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>> {
        let rows = match limit {
            Some(limit) => {
                sqlx::query(
                    "SELECT id, author_id, name, image, text, cooking_time, created_at \
                     FROM recipes WHERE author_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
                )
                .bind(author_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, author_id, name, image, text, cooking_time, created_at \
                     FROM recipes WHERE author_id = ? ORDER BY created_at DESC, id DESC",
                )
                .bind(author_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list recipes by author")?;

        Ok(rows.iter().map(row_to_recipe).collect())
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM recipes WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count recipes by author")?;
        Ok(row.get("count"))
    }

    async fn cart_summary(&self, user_id: i64) -> Result<Vec<ShoppingListEntry>> {
        // One row per distinct ingredient across the whole cart; grouping by
        // ingredient id makes the total independent of how many recipes
        // contributed
        let rows = sqlx::query(
            r#"
            SELECT i.name, i.measurement_unit, SUM(il.amount) as total_amount
            FROM cart_entries ce
            JOIN ingredient_lines il ON il.recipe_id = ce.recipe_id
            JOIN ingredients i ON i.id = il.ingredient_id
            WHERE ce.user_id = ?
            GROUP BY il.ingredient_id
            ORDER BY i.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to aggregate shopping cart")?;

        Ok(rows
            .iter()
            .map(|r| ShoppingListEntry {
                name: r.get("name"),
                measurement_unit: r.get("measurement_unit"),
                total_amount: r.get("total_amount"),
            })
            .collect())
    }
}

fn row_to_recipe(row: &sqlx::sqlite::SqliteRow) -> Recipe {
    Recipe {
        id: row.get("id"),
        author_id: row.get("author_id"),
        name: row.get("name"),
        image: row.get("image"),
        text: row.get("text"),
        cooking_time: row.get("cooking_time"),
        created_at: row.get("created_at"),
    }
}
