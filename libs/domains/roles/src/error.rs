use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use filter_engine::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("Role not found: {0}")]
    NotFound(i64),

    #[error("Role with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RoleResult<T> = Result<T, RoleError>;

impl From<FilterError> for RoleError {
    fn from(err: FilterError) -> Self {
        RoleError::MalformedFilter(err.to_string())
    }
}

/// Convert RoleError to AppError for standardized error responses
impl From<RoleError> for AppError {
    fn from(err: RoleError) -> Self {
        match err {
            RoleError::NotFound(id) => AppError::NotFound(format!("Role {} not found", id)),
            RoleError::DuplicateName(name) => {
                AppError::BadRequest(format!("Role with name '{}' already exists", name))
            }
            RoleError::Validation(msg) => AppError::BadRequest(msg),
            RoleError::MalformedFilter(msg) => AppError::MalformedFilter(msg),
            RoleError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for RoleError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("Permission not found: {0}")]
    NotFound(i64),

    #[error("Permission for {method} {api_path} in module {module} already exists")]
    Duplicate {
        api_path: String,
        method: String,
        module: String,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PermissionResult<T> = Result<T, PermissionError>;

impl From<FilterError> for PermissionError {
    fn from(err: FilterError) -> Self {
        PermissionError::MalformedFilter(err.to_string())
    }
}

/// Convert PermissionError to AppError for standardized error responses
impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        match err {
            PermissionError::NotFound(id) => {
                AppError::NotFound(format!("Permission {} not found", id))
            }
            PermissionError::Duplicate {
                api_path,
                method,
                module,
            } => AppError::BadRequest(format!(
                "Permission for {} {} in module {} already exists",
                method, api_path, module
            )),
            PermissionError::Validation(msg) => AppError::BadRequest(msg),
            PermissionError::MalformedFilter(msg) => AppError::MalformedFilter(msg),
            PermissionError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for PermissionError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
