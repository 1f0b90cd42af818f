//! Ingredient repository
//!
//! Database operations for the global ingredient catalog.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Ingredient;

/// Ingredient repository trait
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Create a new ingredient
    async fn create(&self, ingredient: &Ingredient) -> Result<Ingredient>;

    /// Get ingredient by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Ingredient>>;

    /// List ingredients ordered by name, optionally restricted to a name prefix
    async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>>;

    /// Get the ingredients matching the given ids
    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>>;
}

/// SQLx-based ingredient repository implementation
pub struct SqlxIngredientRepository {
    pool: SqlitePool,
}

impl SqlxIngredientRepository {
    /// Create a new SQLx ingredient repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn IngredientRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl IngredientRepository for SqlxIngredientRepository {
    async fn create(&self, ingredient: &Ingredient) -> Result<Ingredient> {
        let result = sqlx::query("INSERT INTO ingredients (name, measurement_unit) VALUES (?, ?)")
            .bind(&ingredient.name)
            .bind(&ingredient.measurement_unit)
            .execute(&self.pool)
            .await
            .context("Failed to create ingredient")?;

        Ok(Ingredient {
            id: result.last_insert_rowid(),
            name: ingredient.name.clone(),
            measurement_unit: ingredient.measurement_unit.clone(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Ingredient>> {
        let row = sqlx::query("SELECT id, name, measurement_unit FROM ingredients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get ingredient by ID")?;

        Ok(row.map(|r| row_to_ingredient(&r)))
    }

    async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>> {
        let rows = match name_prefix {
            Some(prefix) => {
                sqlx::query(
                    "SELECT id, name, measurement_unit FROM ingredients WHERE name LIKE ? ORDER BY name",
                )
                .bind(format!("{}%", prefix))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT id, name, measurement_unit FROM ingredients ORDER BY name")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .context("Failed to list ingredients")?;

        Ok(rows.iter().map(row_to_ingredient).collect())
    }

    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id IN ({}) ORDER BY id",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to get ingredients by ids")?;

        Ok(rows.iter().map(row_to_ingredient).collect())
    }
}

fn row_to_ingredient(row: &sqlx::sqlite::SqliteRow) -> Ingredient {
    Ingredient {
        id: row.get("id"),
        name: row.get("name"),
        measurement_unit: row.get("measurement_unit"),
    }
}
