//! Shopping list service
//!
//! Turns a user's cart into an aggregated shopping list: each distinct
//! ingredient appears once with its amounts summed across every recipe
//! in the cart, and the list renders to a plain-text document for
//! download.

use anyhow::Result;
use std::sync::Arc;

use crate::db::repositories::RecipeRepository;
use crate::models::ShoppingListEntry;

/// Filename offered for the downloaded document
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// Header line of the rendered document
const DOCUMENT_TITLE: &str = "Shopping List";

/// Service producing aggregated shopping lists
pub struct ShoppingListService {
    recipe_repo: Arc<dyn RecipeRepository>,
}

impl ShoppingListService {
    /// Create a new shopping list service
    pub fn new(recipe_repo: Arc<dyn RecipeRepository>) -> Self {
        Self { recipe_repo }
    }

    /// Aggregated entries for the user's cart, one per distinct
    /// ingredient, ordered by ingredient name
    pub async fn entries(&self, user_id: i64) -> Result<Vec<ShoppingListEntry>> {
        self.recipe_repo.cart_summary(user_id).await
    }

    /// Render the user's shopping list as a plain-text document.
    ///
    /// An empty cart still produces a document with the title and no
    /// rows.
    pub async fn render(&self, user_id: i64) -> Result<String> {
        let entries = self.entries(user_id).await?;
        Ok(render_document(&entries))
    }
}

/// Render entries into the downloadable document: a title line followed
/// by one `<amount> <unit> - <name>` row per ingredient.
fn render_document(entries: &[ShoppingListEntry]) -> String {
    let mut document = String::new();
    document.push_str(DOCUMENT_TITLE);
    document.push('\n');
    document.push('\n');

    for entry in entries {
        document.push_str(&format!(
            "{} {} - {}\n",
            entry.total_amount, entry.measurement_unit, entry.name
        ));
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxRecipeRepository;
    use crate::db::{create_test_pool, migrations};
    use proptest::prelude::*;
    use sqlx::SqlitePool;

    #[test]
    fn test_render_document_rows() {
        let entries = vec![
            ShoppingListEntry {
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                total_amount: 500,
            },
            ShoppingListEntry {
                name: "milk".to_string(),
                measurement_unit: "ml".to_string(),
                total_amount: 300,
            },
        ];

        let document = render_document(&entries);
        let lines: Vec<&str> = document.lines().collect();
        assert_eq!(lines[0], "Shopping List");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "500 g - flour");
        assert_eq!(lines[3], "300 ml - milk");
    }

    #[test]
    fn test_render_empty_cart() {
        let document = render_document(&[]);
        assert_eq!(document, "Shopping List\n\n");
    }

    async fn setup() -> (SqlitePool, ShoppingListService) {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        sqlx::query(
            "INSERT INTO users (email, username, first_name, last_name, password_hash) VALUES ('a@example.com', 'a', 'F', 'L', 'h')",
        )
        .execute(&pool)
        .await
        .expect("Failed to create user");

        for (name, unit) in [("flour", "g"), ("milk", "ml")] {
            sqlx::query("INSERT INTO ingredients (name, measurement_unit) VALUES (?, ?)")
                .bind(name)
                .bind(unit)
                .execute(&pool)
                .await
                .expect("Failed to create ingredient");
        }

        let service = ShoppingListService::new(SqlxRecipeRepository::boxed(pool.clone()));
        (pool, service)
    }

    async fn add_recipe(pool: &SqlitePool, name: &str, lines: &[(i64, i64)]) -> i64 {
        let result = sqlx::query(
            "INSERT INTO recipes (author_id, name, image, text, cooking_time) VALUES (1, ?, '', '', 10)",
        )
        .bind(name)
        .execute(pool)
        .await
        .expect("Failed to create recipe");
        let recipe_id = result.last_insert_rowid();

        for (ingredient_id, amount) in lines {
            sqlx::query(
                "INSERT INTO ingredient_lines (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
            )
            .bind(recipe_id)
            .bind(ingredient_id)
            .bind(amount)
            .execute(pool)
            .await
            .expect("Failed to create line");
        }
        sqlx::query("INSERT INTO cart_entries (user_id, recipe_id, created_at) VALUES (1, ?, datetime('now'))")
            .bind(recipe_id)
            .execute(pool)
            .await
            .expect("Failed to add to cart");

        recipe_id
    }

    #[tokio::test]
    async fn test_entries_sum_across_recipes() {
        let (pool, service) = setup().await;

        add_recipe(&pool, "Bread", &[(1, 400)]).await;
        add_recipe(&pool, "Pancakes", &[(1, 200), (2, 300)]).await;

        let entries = service.entries(1).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "flour");
        assert_eq!(entries[0].total_amount, 600);
        assert_eq!(entries[1].name, "milk");
        assert_eq!(entries[1].total_amount, 300);
    }

    #[tokio::test]
    async fn test_render_for_user() {
        let (pool, service) = setup().await;

        add_recipe(&pool, "Bread", &[(1, 400)]).await;

        let document = service.render(1).await.unwrap();
        assert!(document.contains("400 g - flour"));
    }

    #[tokio::test]
    async fn test_totals_independent_of_recipe_grouping() {
        // The same multiset of ingredient lines split across recipes in
        // different ways must aggregate to the same totals
        let groupings: [&[&[(i64, i64)]]; 3] = [
            &[&[(1, 200), (2, 300)], &[(1, 300)]],
            &[&[(1, 200)], &[(1, 300), (2, 300)]],
            &[&[(1, 200)], &[(1, 300)], &[(2, 300)]],
        ];

        for grouping in groupings {
            let (pool, service) = setup().await;
            for (n, lines) in grouping.iter().enumerate() {
                add_recipe(&pool, &format!("Recipe {}", n), lines).await;
            }

            let entries = service.entries(1).await.unwrap();
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].name, "flour");
            assert_eq!(entries[0].total_amount, 500);
            assert_eq!(entries[1].name, "milk");
            assert_eq!(entries[1].total_amount, 300);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        // The rendered document carries exactly one row per entry, in order
        #[test]
        fn prop_one_row_per_entry(amounts in proptest::collection::vec(1i64..32000, 0..12)) {
            let entries: Vec<ShoppingListEntry> = amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| ShoppingListEntry {
                    name: format!("ingredient{}", i),
                    measurement_unit: "g".to_string(),
                    total_amount: *amount,
                })
                .collect();

            let document = render_document(&entries);
            let rows = document.lines().skip(2).count();
            prop_assert_eq!(rows, entries.len());
        }
    }
}
