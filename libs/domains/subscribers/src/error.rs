use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use filter_engine::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubscriberError {
    #[error("Subscriber not found: {0}")]
    NotFound(i64),

    #[error("Subscriber with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SubscriberResult<T> = Result<T, SubscriberError>;

impl From<FilterError> for SubscriberError {
    fn from(err: FilterError) -> Self {
        SubscriberError::MalformedFilter(err.to_string())
    }
}

/// Convert SubscriberError to AppError for standardized error responses
impl From<SubscriberError> for AppError {
    fn from(err: SubscriberError) -> Self {
        match err {
            SubscriberError::NotFound(id) => {
                AppError::NotFound(format!("Subscriber {} not found", id))
            }
            SubscriberError::DuplicateEmail(email) => {
                AppError::BadRequest(format!("Subscriber with email '{}' already exists", email))
            }
            SubscriberError::Validation(msg) => AppError::BadRequest(msg),
            SubscriberError::MalformedFilter(msg) => AppError::MalformedFilter(msg),
            SubscriberError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for SubscriberError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
