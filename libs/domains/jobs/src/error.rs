use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use filter_engine::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(i64),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type JobResult<T> = Result<T, JobError>;

impl From<FilterError> for JobError {
    fn from(err: FilterError) -> Self {
        JobError::MalformedFilter(err.to_string())
    }
}

/// Convert JobError to AppError for standardized error responses
impl From<JobError> for AppError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(id) => AppError::NotFound(format!("Job {} not found", id)),
            JobError::Validation(msg) => AppError::BadRequest(msg),
            JobError::MalformedFilter(msg) => AppError::MalformedFilter(msg),
            JobError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for JobError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
