//! Recipe model
//!
//! This module provides:
//! - `Recipe` entity and `IngredientLine` (ingredient reference + amount)
//! - Input types for creating and updating recipes
//! - `RecipeFilter` for composing list predicates
//! - Pagination types for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum cooking time in minutes
pub const MIN_COOKING_TIME: i64 = 1;
/// Maximum cooking time in minutes
pub const MAX_COOKING_TIME: i64 = 32000;
/// Minimum ingredient amount
pub const MIN_AMOUNT: i64 = 1;
/// Maximum ingredient amount
pub const MAX_AMOUNT: i64 = 32000;

/// Recipe entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier
    pub id: i64,
    /// Author user ID, fixed at creation
    pub author_id: i64,
    /// Recipe name
    pub name: String,
    /// Image reference (opaque URL or path)
    pub image: String,
    /// Free-text body
    pub text: String,
    /// Cooking time in minutes, within [1, 32000]
    pub cooking_time: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Create a new Recipe with the given fields.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(author_id: i64, name: String, image: String, text: String, cooking_time: i64) -> Self {
        Self {
            id: 0, // Will be set by the database
            author_id,
            name,
            image,
            text,
            cooking_time,
            created_at: Utc::now(),
        }
    }
}

/// An ingredient line attached to a recipe: the referenced catalog
/// ingredient plus the amount used.
///
/// At most one line exists per (recipe, ingredient) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientLine {
    /// Referenced ingredient ID
    pub ingredient_id: i64,
    /// Ingredient name (denormalized for presentation)
    pub name: String,
    /// Measurement unit (denormalized for presentation)
    pub measurement_unit: String,
    /// Amount of the ingredient, within [1, 32000]
    pub amount: i64,
}

/// Ingredient line as submitted by a client: ingredient id + amount
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngredientLineInput {
    pub id: i64,
    pub amount: i64,
}

/// Input for creating a new recipe
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecipeInput {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub ingredients: Vec<IngredientLineInput>,
    pub tags: Vec<i64>,
}

/// Input for updating an existing recipe
///
/// Scalar fields are optional; when `ingredients` or `tags` are present the
/// corresponding sets are wholesale replaced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecipeInput {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub ingredients: Option<Vec<IngredientLineInput>>,
    pub tags: Option<Vec<i64>>,
}

/// Filter configuration for recipe listings.
///
/// All recognized options are independent and combined with logical AND;
/// `tags` is internally OR'd across the given slugs.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Exact match on author id
    pub author: Option<i64>,
    /// Match recipes whose tag set intersects these slugs
    pub tags: Vec<String>,
    /// Restrict to (true) or exclude (false) the requester's favorites
    pub is_favorited: Option<bool>,
    /// Restrict to (true) or exclude (false) the requester's cart
    pub is_in_shopping_cart: Option<bool>,
}

impl RecipeFilter {
    /// True when the filter requires a requester identity to be meaningful.
    ///
    /// An anonymous requester combined with such a filter yields an empty
    /// listing rather than an error.
    pub fn needs_requester(&self) -> bool {
        self.is_favorited.is_some() || self.is_in_shopping_cart.is_some()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries.
    ///
    /// Widened before multiplying so an arbitrarily large page number
    /// from a query string cannot overflow.
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1)) as i64 * self.limit as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            limit: params.limit,
        }
    }

    /// An empty result for the given parameters
    pub fn empty(params: &ListParams) -> Self {
        Self::new(Vec::new(), 0, params)
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 {
            return 0;
        }
        ((self.total as u32) + self.limit - 1) / self.limit
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_clamps() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 100);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_list_params_offset() {
        let params = ListParams::new(3, 10);
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_list_params_offset_huge_page() {
        // A page number at the u32 ceiling must not overflow the offset
        let params = ListParams::new(u32::MAX, 100);
        assert_eq!(params.offset(), (u32::MAX as i64 - 1) * 100);
    }

    #[test]
    fn test_paged_result_total_pages() {
        let params = ListParams::new(1, 10);
        let result: PagedResult<i64> = PagedResult::new(vec![1, 2, 3], 23, &params);
        assert_eq!(result.total_pages(), 3);
    }

    #[test]
    fn test_filter_needs_requester() {
        let mut filter = RecipeFilter::default();
        assert!(!filter.needs_requester());

        filter.author = Some(1);
        filter.tags = vec!["breakfast".to_string()];
        assert!(!filter.needs_requester());

        filter.is_favorited = Some(true);
        assert!(filter.needs_requester());
    }
}
