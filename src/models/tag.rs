//! Tag model
//!
//! Tags form a global catalog used to categorize recipes and to filter
//! recipe listings by slug.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity representing a recipe tag.
///
/// Name and slug are unique across the catalog; the color is a hex string
/// (`#RGB` or `#RRGGBB`) validated at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag name (unique)
    pub name: String,
    /// Hex color code
    pub color: String,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new Tag with the given fields.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(name: String, color: String, slug: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            color,
            slug,
            created_at: Utc::now(),
        }
    }
}
