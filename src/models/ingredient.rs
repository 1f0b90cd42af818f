//! Ingredient model
//!
//! Ingredients form a global catalog (not user-owned). Recipes reference
//! them through ingredient lines carrying an amount.

use serde::{Deserialize, Serialize};

/// Ingredient catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    /// Unique identifier
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Free-text measurement unit, e.g. "g" or "cup"
    pub measurement_unit: String,
}

impl Ingredient {
    /// Create a new Ingredient.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(name: String, measurement_unit: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            measurement_unit,
        }
    }
}

/// One aggregated shopping list row: a distinct ingredient with the summed
/// amount across every recipe in the user's cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingListEntry {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Sum of amounts across all cart recipes using this ingredient
    pub total_amount: i64,
}
