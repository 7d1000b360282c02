use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use filter_engine::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompanyError {
    #[error("Company not found: {0}")]
    NotFound(i64),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CompanyResult<T> = Result<T, CompanyError>;

impl From<FilterError> for CompanyError {
    fn from(err: FilterError) -> Self {
        CompanyError::MalformedFilter(err.to_string())
    }
}

/// Convert CompanyError to AppError for standardized error responses
impl From<CompanyError> for AppError {
    fn from(err: CompanyError) -> Self {
        match err {
            CompanyError::NotFound(id) => AppError::NotFound(format!("Company {} not found", id)),
            CompanyError::Validation(msg) => AppError::BadRequest(msg),
            CompanyError::MalformedFilter(msg) => AppError::MalformedFilter(msg),
            CompanyError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CompanyError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
