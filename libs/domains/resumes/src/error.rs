use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use filter_engine::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("Resume not found: {0}")]
    NotFound(i64),

    #[error("User {0} does not exist")]
    UnknownUser(i64),

    #[error("Job {0} does not exist")]
    UnknownJob(i64),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ResumeResult<T> = Result<T, ResumeError>;

impl From<FilterError> for ResumeError {
    fn from(err: FilterError) -> Self {
        ResumeError::MalformedFilter(err.to_string())
    }
}

/// Convert ResumeError to AppError for standardized error responses
impl From<ResumeError> for AppError {
    fn from(err: ResumeError) -> Self {
        match err {
            ResumeError::NotFound(id) => AppError::NotFound(format!("Resume {} not found", id)),
            ResumeError::UnknownUser(id) => {
                AppError::BadRequest(format!("User {} does not exist", id))
            }
            ResumeError::UnknownJob(id) => {
                AppError::BadRequest(format!("Job {} does not exist", id))
            }
            ResumeError::Validation(msg) => AppError::BadRequest(msg),
            ResumeError::MalformedFilter(msg) => AppError::MalformedFilter(msg),
            ResumeError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ResumeError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
