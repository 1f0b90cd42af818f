//! Toggleable relation models
//!
//! A relation is a uniqueness-constrained (subject, object) pair: a user
//! favoriting a recipe, queueing a recipe in the shopping cart, or
//! subscribing to an author. All three share the same add/remove semantics
//! and are distinguished only by `RelationKind`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of toggleable relation, selecting the backing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// User has favorited a recipe
    Favorite,
    /// User has queued a recipe for shopping
    Cart,
    /// User follows another author
    Subscription,
}

impl RelationKind {
    /// Database table backing this relation kind
    pub fn table(&self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites",
            RelationKind::Cart => "cart_entries",
            RelationKind::Subscription => "subscriptions",
        }
    }

    /// Column name of the object side of the pair
    pub fn object_column(&self) -> &'static str {
        match self {
            RelationKind::Favorite | RelationKind::Cart => "recipe_id",
            RelationKind::Subscription => "author_id",
        }
    }

    /// True when the object of the relation is a recipe
    pub fn targets_recipe(&self) -> bool {
        matches!(self, RelationKind::Favorite | RelationKind::Cart)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RelationKind::Favorite => "favorite",
            RelationKind::Cart => "shopping cart entry",
            RelationKind::Subscription => "subscription",
        };
        write!(f, "{}", name)
    }
}

/// A persisted (subject, object) relation row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relation {
    /// Unique identifier
    pub id: i64,
    /// Relation kind
    pub kind: RelationKind,
    /// Acting user ID
    pub subject_id: i64,
    /// Target recipe or author ID
    pub object_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tables() {
        assert_eq!(RelationKind::Favorite.table(), "favorites");
        assert_eq!(RelationKind::Cart.table(), "cart_entries");
        assert_eq!(RelationKind::Subscription.table(), "subscriptions");
    }

    #[test]
    fn test_kind_object_columns() {
        assert_eq!(RelationKind::Favorite.object_column(), "recipe_id");
        assert_eq!(RelationKind::Subscription.object_column(), "author_id");
    }

    #[test]
    fn test_targets_recipe() {
        assert!(RelationKind::Favorite.targets_recipe());
        assert!(RelationKind::Cart.targets_recipe());
        assert!(!RelationKind::Subscription.targets_recipe());
    }
}
