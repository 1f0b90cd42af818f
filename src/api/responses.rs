//! API response types
//!
//! The presentation layer: response shapes for users, tags, ingredients
//! and recipes, including the requester-relative computed flags
//! `is_subscribed`, `is_favorited` and `is_in_shopping_cart`. Every flag
//! is `false` for anonymous requesters.

use serde::Serialize;
use std::collections::HashSet;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Ingredient, IngredientLine, PagedResult, Recipe, RelationKind, Tag, User};
use crate::services::user::UserWithRecipes;

/// User info with the requester-relative subscription flag
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserResponse {
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// Tag info
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        }
    }
}

/// Ingredient catalog info
#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// Ingredient line inside a recipe response
#[derive(Debug, Serialize)]
pub struct IngredientLineResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl From<IngredientLine> for IngredientLineResponse {
    fn from(line: IngredientLine) -> Self {
        Self {
            id: line.ingredient_id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Full recipe with author, tags, ingredient lines and the
/// requester-relative flags
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub author: UserResponse,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientLineResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Compact recipe shape used in toggle responses and subscription
/// listings
#[derive(Debug, Serialize)]
pub struct RecipeShortResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

impl From<&Recipe> for RecipeShortResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// A subscribed-to author with their recipes
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeShortResponse>,
    pub recipes_count: i64,
}

impl SubscriptionResponse {
    pub fn new(entry: UserWithRecipes) -> Self {
        let recipes = entry.recipes.iter().map(RecipeShortResponse::from).collect();
        Self {
            // Listed authors are by definition subscribed to
            user: UserResponse::new(entry.user, true),
            recipes,
            recipes_count: entry.recipes_count,
        }
    }
}

/// Paginated response envelope
#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub count: i64,
    pub page: u32,
    pub limit: u32,
    pub results: Vec<T>,
}

impl<T> PagedResponse<T> {
    pub fn new<S>(paged: PagedResult<S>, results: Vec<T>) -> Self {
        Self {
            count: paged.total,
            page: paged.page,
            limit: paged.limit,
            results,
        }
    }
}

/// Requester-relative relation sets, fetched once per request so a
/// whole page of recipes can be flagged without per-row queries.
pub struct RequesterContext {
    favorites: HashSet<i64>,
    cart: HashSet<i64>,
    subscriptions: HashSet<i64>,
}

impl RequesterContext {
    /// Load the requester's relation sets; anonymous requesters get
    /// empty sets so every flag renders `false`.
    pub async fn load(state: &AppState, requester: Option<i64>) -> Result<Self, ApiError> {
        let Some(user_id) = requester else {
            return Ok(Self {
                favorites: HashSet::new(),
                cart: HashSet::new(),
                subscriptions: HashSet::new(),
            });
        };

        let favorites = state
            .toggle_service
            .active_objects(RelationKind::Favorite, user_id)
            .await?
            .into_iter()
            .collect();
        let cart = state
            .toggle_service
            .active_objects(RelationKind::Cart, user_id)
            .await?
            .into_iter()
            .collect();
        let subscriptions = state
            .toggle_service
            .active_objects(RelationKind::Subscription, user_id)
            .await?
            .into_iter()
            .collect();

        Ok(Self {
            favorites,
            cart,
            subscriptions,
        })
    }

    pub fn is_favorited(&self, recipe_id: i64) -> bool {
        self.favorites.contains(&recipe_id)
    }

    pub fn is_in_cart(&self, recipe_id: i64) -> bool {
        self.cart.contains(&recipe_id)
    }

    pub fn is_subscribed(&self, author_id: i64) -> bool {
        self.subscriptions.contains(&author_id)
    }
}

/// Assemble the full recipe response: author, tags, ingredient lines
/// and the requester-relative flags.
pub async fn build_recipe_response(
    state: &AppState,
    recipe: Recipe,
    ctx: &RequesterContext,
) -> Result<RecipeResponse, ApiError> {
    let author = state.user_service.get(recipe.author_id).await?;
    let tags = state.tag_service.for_recipe(recipe.id).await?;
    let lines = state.recipe_service.lines_for(recipe.id).await?;

    Ok(RecipeResponse {
        id: recipe.id,
        author: UserResponse::new(author, ctx.is_subscribed(recipe.author_id)),
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
        tags: tags.into_iter().map(TagResponse::from).collect(),
        ingredients: lines.into_iter().map(IngredientLineResponse::from).collect(),
        is_favorited: ctx.is_favorited(recipe.id),
        is_in_shopping_cart: ctx.is_in_cart(recipe.id),
    })
}
