use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// E-mail address (unique across all users)
    pub email: String,
}

/// DTO for registering a user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewUser {
    #[validate(length(min = 2, max = 250))]
    pub name: String,
    #[validate(email, length(min = 6, max = 254))]
    pub email: String,
}

/// Query parameters for the admin user listing
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct UserListQuery {
    /// Comma-separated user IDs to restrict the listing to
    pub ids: Option<String>,
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

impl UserListQuery {
    /// Parse the comma-separated `ids` parameter, dropping malformed entries.
    pub fn id_list(&self) -> Option<Vec<i64>> {
        self.ids.as_ref().map(|raw| {
            raw.split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        })
    }
}
