//! Data models
//!
//! This module contains all data structures used throughout the Ladle service.
//! Models represent:
//! - Database entities (User, Recipe, Ingredient, Tag, relations)
//! - Input types for create/update operations
//! - Pagination and filter types for list queries

mod ingredient;
mod recipe;
mod relation;
mod session;
mod tag;
mod user;

pub use ingredient::{Ingredient, ShoppingListEntry};
pub use recipe::{
    CreateRecipeInput, IngredientLine, IngredientLineInput, ListParams, PagedResult, Recipe,
    RecipeFilter, UpdateRecipeInput, MAX_AMOUNT, MAX_COOKING_TIME, MIN_AMOUNT, MIN_COOKING_TIME,
};
pub use relation::{Relation, RelationKind};
pub use session::Session;
pub use tag::Tag;
pub use user::{CreateUserInput, User};
