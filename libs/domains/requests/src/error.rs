use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request not found: {0}")]
    NotFound(i64),

    #[error("Event not found: {0}")]
    EventNotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("User {0} already applied to event {1}")]
    Duplicate(i64, i64),

    #[error("User {0} cannot apply to their own event")]
    OwnEvent(i64),

    #[error("Event {0} is not published")]
    NotPublished(i64),

    #[error("Participant limit reached for event {0}")]
    LimitReached(i64),

    #[error("Request {0} is not pending")]
    NotPending(i64),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type RequestResult<T> = Result<T, RequestError>;

/// Convert RequestError to AppError for standardized error responses
impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NotFound(id) => AppError::NotFound(format!("Request {} not found", id)),
            RequestError::EventNotFound(id) => {
                AppError::NotFound(format!("Event {} not found", id))
            }
            RequestError::UserNotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            RequestError::Duplicate(user_id, event_id) => AppError::Conflict(format!(
                "User {} already applied to event {}",
                user_id, event_id
            )),
            RequestError::OwnEvent(user_id) => AppError::Conflict(format!(
                "User {} cannot apply to their own event",
                user_id
            )),
            RequestError::NotPublished(id) => {
                AppError::Conflict(format!("Event {} is not published", id))
            }
            RequestError::LimitReached(id) => {
                AppError::Conflict(format!("Participant limit reached for event {}", id))
            }
            RequestError::NotPending(id) => {
                AppError::Conflict(format!("Request {} is not pending", id))
            }
            RequestError::Validation(msg) => AppError::BadRequest(msg),
            RequestError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
