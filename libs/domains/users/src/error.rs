use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(i64),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("User {0} cannot subscribe to themselves")]
    SelfSubscription(i64),

    #[error("User {follower} already follows user {followed}")]
    AlreadySubscribed { follower: i64, followed: i64 },

    #[error("User {follower} does not follow user {followed}")]
    NotSubscribed { follower: i64, followed: i64 },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::DuplicateEmail(email) => {
                AppError::Conflict(format!("User with email '{}' already exists", email))
            }
            UserError::SelfSubscription(id) => {
                AppError::Conflict(format!("User {} cannot subscribe to themselves", id))
            }
            UserError::AlreadySubscribed { follower, followed } => AppError::Conflict(format!(
                "User {} already follows user {}",
                follower, followed
            )),
            UserError::NotSubscribed { follower, followed } => AppError::NotFound(format!(
                "User {} does not follow user {}",
                follower, followed
            )),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
