use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    StateConflict(String),

    /// Participation counter failure. Confirmed counts are load-bearing for
    /// availability and output correctness, so this aborts the request.
    #[error("Statistics dependency failed: {0}")]
    Stats(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type EventResult<T> = Result<T, EventError>;

/// Convert EventError to AppError for standardized error responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound(msg) => AppError::NotFound(msg),
            EventError::Validation(msg) => AppError::BadRequest(msg),
            EventError::StateConflict(msg) => AppError::Conflict(msg),
            EventError::Stats(msg) => AppError::ServiceUnavailable(msg),
            EventError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
