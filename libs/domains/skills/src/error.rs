use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use filter_engine::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("Skill not found: {0}")]
    NotFound(i64),

    #[error("Skill with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SkillResult<T> = Result<T, SkillError>;

impl From<FilterError> for SkillError {
    fn from(err: FilterError) -> Self {
        SkillError::MalformedFilter(err.to_string())
    }
}

/// Convert SkillError to AppError for standardized error responses
impl From<SkillError> for AppError {
    fn from(err: SkillError) -> Self {
        match err {
            SkillError::NotFound(id) => AppError::NotFound(format!("Skill {} not found", id)),
            SkillError::DuplicateName(name) => {
                AppError::BadRequest(format!("Skill with name '{}' already exists", name))
            }
            SkillError::Validation(msg) => AppError::BadRequest(msg),
            SkillError::MalformedFilter(msg) => AppError::MalformedFilter(msg),
            SkillError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for SkillError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
