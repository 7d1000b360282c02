//! Role-permission authorization for the /api surface.
//!
//! Every request outside the public prefixes must carry a valid token and
//! the caller's role must hold a permission whose method and path template
//! match the request. SUPER_ADMIN bypasses the permission check.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_helpers::auth::JwtClaims;
use axum_helpers::AppError;
use domain_roles::entity::{permission, permission_role, role};
use domain_roles::SUPER_ADMIN_ROLE;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Route prefixes that skip the permission check entirely.
const PUBLIC_PREFIXES: &[&str] = &["/api/v1/auth"];

#[derive(Clone)]
pub struct PermissionGuard {
    db: DatabaseConnection,
}

impl PermissionGuard {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn authorize(&self, user_id: i64, method: &str, path: &str) -> Result<(), AppError> {
        let user = domain_users::entity::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(internal)?
            .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

        let Some(role_id) = user.role_id else {
            return Err(AppError::Forbidden("No role assigned".to_string()));
        };

        let user_role = role::Entity::find_by_id(role_id)
            .one(&self.db)
            .await
            .map_err(internal)?
            .ok_or_else(|| AppError::Forbidden("No role assigned".to_string()))?;

        if !user_role.active {
            return Err(AppError::Forbidden("Role is inactive".to_string()));
        }
        if user_role.name == SUPER_ADMIN_ROLE {
            return Ok(());
        }

        let permission_ids: Vec<i64> = permission_role::Entity::find()
            .filter(permission_role::Column::RoleId.eq(role_id))
            .all(&self.db)
            .await
            .map_err(internal)?
            .into_iter()
            .map(|link| link.permission_id)
            .collect();

        if !permission_ids.is_empty() {
            let permissions = permission::Entity::find()
                .filter(permission::Column::Id.is_in(permission_ids))
                .all(&self.db)
                .await
                .map_err(internal)?;

            let allowed = permissions
                .iter()
                .any(|p| p.method.eq_ignore_ascii_case(method) && path_matches(&p.api_path, path));
            if allowed {
                return Ok(());
            }
        }

        tracing::warn!(user_id, method, path, "Permission denied");
        Err(AppError::Forbidden(
            "You do not have permission to access this endpoint".to_string(),
        ))
    }
}

fn internal(e: sea_orm::DbErr) -> AppError {
    AppError::InternalServerError(format!("Database error: {}", e))
}

/// Match a request path against a permission path template. Template
/// segments wrapped in braces match any single path segment.
fn path_matches(template: &str, path: &str) -> bool {
    let template_segments: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    template_segments.len() == path_segments.len()
        && template_segments
            .iter()
            .zip(&path_segments)
            .all(|(t, p)| (t.starts_with('{') && t.ends_with('}')) || t == p)
}

/// Middleware enforcing role permissions on every non-public API route.
/// Runs behind the optional JWT middleware, which populates the claims.
pub async fn permission_guard(
    State(guard): State<PermissionGuard>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();
    let method = request.method().as_str().to_string();

    if PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return Ok(next.run(request).await);
    }

    let claims = request
        .extensions()
        .get::<JwtClaims>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    guard.authorize(claims.user.id, &method, &path).await?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_template_matching() {
        assert!(path_matches("/api/v1/jobs", "/api/v1/jobs"));
        assert!(path_matches("/api/v1/jobs/{id}", "/api/v1/jobs/42"));
        assert!(!path_matches("/api/v1/jobs/{id}", "/api/v1/jobs"));
        assert!(!path_matches("/api/v1/jobs", "/api/v1/skills"));
        assert!(!path_matches("/api/v1/jobs/{id}", "/api/v1/jobs/42/extra"));
    }

    #[test]
    fn test_public_prefix_covers_auth_routes() {
        assert!(PUBLIC_PREFIXES
            .iter()
            .any(|p| "/api/v1/auth/login".starts_with(p)));
        assert!(!PUBLIC_PREFIXES
            .iter()
            .any(|p| "/api/v1/users".starts_with(p)));
    }
}
