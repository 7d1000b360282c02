use axum_helpers::pagination::{Page, PageQuery};
use std::sync::Arc;
use validator::Validate;

use crate::error::{PermissionError, PermissionResult, RoleError, RoleResult};
use crate::models::{
    CreatePermission, CreateRole, Permission, Role, UpdatePermission, UpdateRole,
};
use crate::repository::{PermissionRepository, RoleRepository};

/// Service layer for Role business logic
#[derive(Clone)]
pub struct RoleService<R: RoleRepository> {
    repository: Arc<R>,
}

impl<R: RoleRepository> RoleService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new role
    pub async fn create_role(&self, input: CreateRole, actor: Option<String>) -> RoleResult<Role> {
        input
            .validate()
            .map_err(|e| RoleError::Validation(e.to_string()))?;

        self.repository.create(input, actor).await
    }

    /// Get a role by ID
    pub async fn get_role(&self, id: i64) -> RoleResult<Role> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(RoleError::NotFound(id))
    }

    /// List roles with pagination and an optional filter expression
    pub async fn list_roles(&self, query: &PageQuery) -> RoleResult<Page<Role>> {
        let filter = query.filter.as_deref().map(filter_engine::parse).transpose()?;
        self.repository.find_page(filter, query.to_request()).await
    }

    /// Update a role
    pub async fn update_role(
        &self,
        id: i64,
        input: UpdateRole,
        actor: Option<String>,
    ) -> RoleResult<Role> {
        input
            .validate()
            .map_err(|e| RoleError::Validation(e.to_string()))?;

        self.repository.update(id, input, actor).await
    }

    /// Delete a role
    pub async fn delete_role(&self, id: i64) -> RoleResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(RoleError::NotFound(id));
        }
        Ok(())
    }
}

/// Service layer for Permission business logic
#[derive(Clone)]
pub struct PermissionService<R: PermissionRepository> {
    repository: Arc<R>,
}

impl<R: PermissionRepository> PermissionService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new permission
    pub async fn create_permission(
        &self,
        input: CreatePermission,
        actor: Option<String>,
    ) -> PermissionResult<Permission> {
        input
            .validate()
            .map_err(|e| PermissionError::Validation(e.to_string()))?;

        self.repository.create(input, actor).await
    }

    /// Get a permission by ID
    pub async fn get_permission(&self, id: i64) -> PermissionResult<Permission> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(PermissionError::NotFound(id))
    }

    /// List permissions with pagination and an optional filter expression
    pub async fn list_permissions(&self, query: &PageQuery) -> PermissionResult<Page<Permission>> {
        let filter = query.filter.as_deref().map(filter_engine::parse).transpose()?;
        self.repository.find_page(filter, query.to_request()).await
    }

    /// Update a permission
    pub async fn update_permission(
        &self,
        id: i64,
        input: UpdatePermission,
        actor: Option<String>,
    ) -> PermissionResult<Permission> {
        input
            .validate()
            .map_err(|e| PermissionError::Validation(e.to_string()))?;

        self.repository.update(id, input, actor).await
    }

    /// Delete a permission
    pub async fn delete_permission(&self, id: i64) -> PermissionResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(PermissionError::NotFound(id));
        }
        Ok(())
    }
}
