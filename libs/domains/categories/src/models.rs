use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Category of an event (concerts, exhibitions, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Display name (unique across all categories)
    pub name: String,
}

/// DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

/// DTO for renaming a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

/// Pagination window for category listings
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, IntoParams)]
pub struct CategoryPage {
    /// Number of items to skip
    #[serde(default)]
    pub from: u64,
    /// Page size
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_size() -> u64 {
    10
}

impl Default for CategoryPage {
    fn default() -> Self {
        Self {
            from: 0,
            size: default_size(),
        }
    }
}
