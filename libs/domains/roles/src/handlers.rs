use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    auth::AuthClaims,
    errors::responses::{
        BadRequestFilterResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
    pagination::{Page, PageQuery},
    IdPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{PermissionResult, RoleResult};
use crate::models::{
    CreatePermission, CreateRole, Permission, Role, UpdatePermission, UpdateRole,
};
use crate::repository::{PermissionRepository, RoleRepository};
use crate::service::{PermissionService, RoleService};

const ROLES_TAG: &str = "roles";
const PERMISSIONS_TAG: &str = "permissions";

/// OpenAPI documentation for the Roles API
#[derive(OpenApi)]
#[openapi(
    paths(list_roles, create_role, get_role, update_role, delete_role),
    components(
        schemas(Role, CreateRole, UpdateRole, Page<Role>),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestFilterResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = ROLES_TAG, description = "Role management endpoints")
    )
)]
pub struct ApiDoc;

/// OpenAPI documentation for the Permissions API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_permissions,
        create_permission,
        get_permission,
        update_permission,
        delete_permission
    ),
    components(
        schemas(Permission, CreatePermission, UpdatePermission, Page<Permission>),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestFilterResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = PERMISSIONS_TAG, description = "Permission management endpoints")
    )
)]
pub struct PermissionsApiDoc;

/// Create the role router with all HTTP endpoints
pub fn roles_router<R: RoleRepository + 'static>(service: RoleService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/{id}", get(get_role).put(update_role).delete(delete_role))
        .with_state(shared_service)
}

/// Create the permission router with all HTTP endpoints
pub fn permissions_router<R: PermissionRepository + 'static>(
    service: PermissionService<R>,
) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_permissions).post(create_permission))
        .route(
            "/{id}",
            get(get_permission)
                .put(update_permission)
                .delete(delete_permission),
        )
        .with_state(shared_service)
}

/// List roles with pagination and an optional filter
#[utoipa::path(
    get,
    path = "",
    tag = ROLES_TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of roles", body = Page<Role>),
        (status = 400, response = BadRequestFilterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_roles<R: RoleRepository>(
    State(service): State<Arc<RoleService<R>>>,
    Query(query): Query<PageQuery>,
) -> RoleResult<Json<Page<Role>>> {
    let page = service.list_roles(&query).await?;
    Ok(Json(page))
}

/// Create a new role
#[utoipa::path(
    post,
    path = "",
    tag = ROLES_TAG,
    request_body = CreateRole,
    responses(
        (status = 201, description = "Role created successfully", body = Role),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_role<R: RoleRepository>(
    State(service): State<Arc<RoleService<R>>>,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<CreateRole>,
) -> RoleResult<impl IntoResponse> {
    let role = service.create_role(input, claims.map(|c| c.actor())).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// Get a role by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = ROLES_TAG,
    params(
        ("id" = i64, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role found", body = Role),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_role<R: RoleRepository>(
    State(service): State<Arc<RoleService<R>>>,
    IdPath(id): IdPath,
) -> RoleResult<Json<Role>> {
    let role = service.get_role(id).await?;
    Ok(Json(role))
}

/// Update a role
#[utoipa::path(
    put,
    path = "/{id}",
    tag = ROLES_TAG,
    params(
        ("id" = i64, Path, description = "Role ID")
    ),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Role updated successfully", body = Role),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_role<R: RoleRepository>(
    State(service): State<Arc<RoleService<R>>>,
    IdPath(id): IdPath,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<UpdateRole>,
) -> RoleResult<Json<Role>> {
    let role = service
        .update_role(id, input, claims.map(|c| c.actor()))
        .await?;
    Ok(Json(role))
}

/// Delete a role
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = ROLES_TAG,
    params(
        ("id" = i64, Path, description = "Role ID")
    ),
    responses(
        (status = 204, description = "Role deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_role<R: RoleRepository>(
    State(service): State<Arc<RoleService<R>>>,
    IdPath(id): IdPath,
) -> RoleResult<impl IntoResponse> {
    service.delete_role(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List permissions with pagination and an optional filter
#[utoipa::path(
    get,
    path = "",
    tag = PERMISSIONS_TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of permissions", body = Page<Permission>),
        (status = 400, response = BadRequestFilterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_permissions<R: PermissionRepository>(
    State(service): State<Arc<PermissionService<R>>>,
    Query(query): Query<PageQuery>,
) -> PermissionResult<Json<Page<Permission>>> {
    let page = service.list_permissions(&query).await?;
    Ok(Json(page))
}

/// Create a new permission
#[utoipa::path(
    post,
    path = "",
    tag = PERMISSIONS_TAG,
    request_body = CreatePermission,
    responses(
        (status = 201, description = "Permission created successfully", body = Permission),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_permission<R: PermissionRepository>(
    State(service): State<Arc<PermissionService<R>>>,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<CreatePermission>,
) -> PermissionResult<impl IntoResponse> {
    let permission = service
        .create_permission(input, claims.map(|c| c.actor()))
        .await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

/// Get a permission by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PERMISSIONS_TAG,
    params(
        ("id" = i64, Path, description = "Permission ID")
    ),
    responses(
        (status = 200, description = "Permission found", body = Permission),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_permission<R: PermissionRepository>(
    State(service): State<Arc<PermissionService<R>>>,
    IdPath(id): IdPath,
) -> PermissionResult<Json<Permission>> {
    let permission = service.get_permission(id).await?;
    Ok(Json(permission))
}

/// Update a permission
#[utoipa::path(
    put,
    path = "/{id}",
    tag = PERMISSIONS_TAG,
    params(
        ("id" = i64, Path, description = "Permission ID")
    ),
    request_body = UpdatePermission,
    responses(
        (status = 200, description = "Permission updated successfully", body = Permission),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_permission<R: PermissionRepository>(
    State(service): State<Arc<PermissionService<R>>>,
    IdPath(id): IdPath,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<UpdatePermission>,
) -> PermissionResult<Json<Permission>> {
    let permission = service
        .update_permission(id, input, claims.map(|c| c.actor()))
        .await?;
    Ok(Json(permission))
}

/// Delete a permission
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PERMISSIONS_TAG,
    params(
        ("id" = i64, Path, description = "Permission ID")
    ),
    responses(
        (status = 204, description = "Permission deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_permission<R: PermissionRepository>(
    State(service): State<Arc<PermissionService<R>>>,
    IdPath(id): IdPath,
) -> PermissionResult<impl IntoResponse> {
    service.delete_permission(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryPermissionRepository, InMemoryRoleRepository};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn roles_app() -> Router {
        roles_router(RoleService::new(InMemoryRoleRepository::new()))
    }

    fn permissions_app() -> Router {
        permissions_router(PermissionService::new(InMemoryPermissionRepository::new()))
    }

    #[tokio::test]
    async fn test_create_role_returns_201() {
        let app = roles_app();

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"HR","description":"Hiring"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let created: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(created["active"], serde_json::json!(true));
        assert!(created["permissions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_role_returns_404() {
        let app = roles_app();

        let response = app
            .oneshot(Request::get("/42").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_roles_returns_page_envelope() {
        let app = roles_app();

        let response = app
            .oneshot(Request::get("/?page=1&pageSize=5").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let page: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(page["meta"]["page"], serde_json::json!(1));
        assert_eq!(page["meta"]["pageSize"], serde_json::json!(5));
        assert!(page["result"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_permission_crud_round_trip() {
        let app = permissions_app();

        let response = app
            .clone()
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"name":"List jobs","api_path":"/api/v1/jobs","method":"GET","module":"JOBS"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let created: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let id = created["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::put(format!("/{}", id))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Fetch jobs"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::delete(format!("/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_malformed_filter_returns_400() {
        let app = permissions_app();

        let response = app
            .oneshot(
                Request::get("/?filter=method%20%3A")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
