//! Services layer - Business logic
//!
//! This module contains all business logic services for the Ladle recipe
//! platform. Services are responsible for:
//! - Implementing business rules
//! - Coordinating between repositories
//! - Handling validation and error cases

pub mod ingredient;
pub mod password;
pub mod recipe;
pub mod shopping_list;
pub mod tag;
pub mod toggle;
pub mod user;

pub use ingredient::IngredientService;
pub use password::{hash_password, verify_password};
pub use recipe::{RecipeService, RecipeServiceError};
pub use shopping_list::{ShoppingListService, SHOPPING_LIST_FILENAME};
pub use tag::{TagService, TagServiceError};
pub use toggle::{ToggleService, ToggleServiceError};
pub use user::{LoginInput, UserService, UserServiceError, UserWithRecipes};
