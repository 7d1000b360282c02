use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use filter_engine::FilterNode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{PermissionError, PermissionResult, RoleError, RoleResult};
use crate::models::{
    CreatePermission, CreateRole, Permission, Role, UpdatePermission, UpdateRole,
};

/// Repository trait for Permission persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Create a new permission
    async fn create(
        &self,
        input: CreatePermission,
        actor: Option<String>,
    ) -> PermissionResult<Permission>;

    /// Get a permission by ID
    async fn get_by_id(&self, id: i64) -> PermissionResult<Option<Permission>>;

    /// List a page of permissions matching an optional filter
    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> PermissionResult<Page<Permission>>;

    /// Update an existing permission
    async fn update(
        &self,
        id: i64,
        input: UpdatePermission,
        actor: Option<String>,
    ) -> PermissionResult<Permission>;

    /// Delete a permission by ID
    async fn delete(&self, id: i64) -> PermissionResult<bool>;
}

/// Repository trait for Role persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Create a new role. Unknown permission ids are dropped.
    async fn create(&self, input: CreateRole, actor: Option<String>) -> RoleResult<Role>;

    /// Get a role with its permissions by ID
    async fn get_by_id(&self, id: i64) -> RoleResult<Option<Role>>;

    /// List a page of roles matching an optional filter
    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> RoleResult<Page<Role>>;

    /// Update an existing role. A present permission_ids list replaces the set.
    async fn update(&self, id: i64, input: UpdateRole, actor: Option<String>) -> RoleResult<Role>;

    /// Delete a role by ID
    async fn delete(&self, id: i64) -> RoleResult<bool>;
}

/// Evaluate a filter node against a serializable record.
fn filter_matches<T: serde::Serialize, E>(node: &FilterNode, record: &T) -> Result<bool, E>
where
    E: From<filter_engine::FilterError> + From<String>,
{
    let value = serde_json::to_value(record)
        .map_err(|e| E::from(format!("Serialization error: {}", e)))?;
    Ok(filter_engine::matches(node, &value)?)
}

impl From<String> for RoleError {
    fn from(msg: String) -> Self {
        RoleError::Internal(msg)
    }
}

impl From<String> for PermissionError {
    fn from(msg: String) -> Self {
        PermissionError::Internal(msg)
    }
}

/// In-memory implementation of PermissionRepository (for development/testing)
#[derive(Debug, Default)]
pub struct InMemoryPermissionRepository {
    permissions: Arc<RwLock<HashMap<i64, Permission>>>,
    next_id: AtomicI64,
}

impl InMemoryPermissionRepository {
    pub fn new() -> Self {
        Self {
            permissions: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

fn is_duplicate_permission(existing: &Permission, api_path: &str, method: &str, module: &str) -> bool {
    existing.api_path == api_path
        && existing.method.eq_ignore_ascii_case(method)
        && existing.module.eq_ignore_ascii_case(module)
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn create(
        &self,
        input: CreatePermission,
        actor: Option<String>,
    ) -> PermissionResult<Permission> {
        let mut permissions = self.permissions.write().await;

        let exists = permissions
            .values()
            .any(|p| is_duplicate_permission(p, &input.api_path, &input.method, &input.module));
        if exists {
            return Err(PermissionError::Duplicate {
                api_path: input.api_path,
                method: input.method,
                module: input.module,
            });
        }

        let permission = Permission {
            id: self.allocate_id(),
            name: input.name,
            api_path: input.api_path,
            method: input.method,
            module: input.module,
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: actor,
            updated_by: None,
        };
        permissions.insert(permission.id, permission.clone());

        tracing::info!(permission_id = permission.id, "Created permission");
        Ok(permission)
    }

    async fn get_by_id(&self, id: i64) -> PermissionResult<Option<Permission>> {
        let permissions = self.permissions.read().await;
        Ok(permissions.get(&id).cloned())
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> PermissionResult<Page<Permission>> {
        let permissions = self.permissions.read().await;

        let mut matching = Vec::new();
        for permission in permissions.values() {
            let keep = match &filter {
                Some(node) => filter_matches::<_, PermissionError>(node, permission)?,
                None => true,
            };
            if keep {
                matching.push(permission.clone());
            }
        }

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let window: Vec<Permission> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(page, total, window))
    }

    async fn update(
        &self,
        id: i64,
        input: UpdatePermission,
        actor: Option<String>,
    ) -> PermissionResult<Permission> {
        let mut permissions = self.permissions.write().await;

        let current = permissions
            .get(&id)
            .cloned()
            .ok_or(PermissionError::NotFound(id))?;
        let api_path = input.api_path.clone().unwrap_or(current.api_path);
        let method = input.method.clone().unwrap_or(current.method);
        let module = input.module.clone().unwrap_or(current.module);

        let exists = permissions
            .values()
            .any(|p| p.id != id && is_duplicate_permission(p, &api_path, &method, &module));
        if exists {
            return Err(PermissionError::Duplicate {
                api_path,
                method,
                module,
            });
        }

        let permission = permissions
            .get_mut(&id)
            .ok_or(PermissionError::NotFound(id))?;
        permission.apply_update(input, actor);
        let updated = permission.clone();

        tracing::info!(permission_id = id, "Updated permission");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> PermissionResult<bool> {
        let mut permissions = self.permissions.write().await;

        if permissions.remove(&id).is_some() {
            tracing::info!(permission_id = id, "Deleted permission");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// In-memory implementation of RoleRepository (for development/testing)
///
/// Carries its own permission catalog so permission_ids can be resolved
/// without a database.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    roles: Arc<RwLock<HashMap<i64, Role>>>,
    catalog: Arc<RwLock<HashMap<i64, Permission>>>,
    next_id: AtomicI64,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self {
            roles: Arc::new(RwLock::new(HashMap::new())),
            catalog: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    /// Seed the permission catalog used to resolve permission ids.
    pub fn with_permissions(permissions: Vec<Permission>) -> Self {
        let catalog = permissions.into_iter().map(|p| (p.id, p)).collect();
        Self {
            roles: Arc::new(RwLock::new(HashMap::new())),
            catalog: Arc::new(RwLock::new(catalog)),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn resolve_permissions(&self, ids: &[i64]) -> Vec<Permission> {
        let catalog = self.catalog.read().await;
        ids.iter().filter_map(|id| catalog.get(id).cloned()).collect()
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn create(&self, input: CreateRole, actor: Option<String>) -> RoleResult<Role> {
        let permissions = self.resolve_permissions(&input.permission_ids).await;
        let mut roles = self.roles.write().await;

        let name_exists = roles
            .values()
            .any(|r| r.name.to_lowercase() == input.name.to_lowercase());
        if name_exists {
            return Err(RoleError::DuplicateName(input.name));
        }

        let role = Role {
            id: self.allocate_id(),
            name: input.name,
            description: input.description,
            active: input.active,
            permissions,
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: actor,
            updated_by: None,
        };
        roles.insert(role.id, role.clone());

        tracing::info!(role_id = role.id, "Created role");
        Ok(role)
    }

    async fn get_by_id(&self, id: i64) -> RoleResult<Option<Role>> {
        let roles = self.roles.read().await;
        Ok(roles.get(&id).cloned())
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> RoleResult<Page<Role>> {
        let roles = self.roles.read().await;

        let mut matching = Vec::new();
        for role in roles.values() {
            let keep = match &filter {
                Some(node) => filter_matches::<_, RoleError>(node, role)?,
                None => true,
            };
            if keep {
                matching.push(role.clone());
            }
        }

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let window: Vec<Role> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(page, total, window))
    }

    async fn update(&self, id: i64, input: UpdateRole, actor: Option<String>) -> RoleResult<Role> {
        let replacement = match &input.permission_ids {
            Some(ids) => Some(self.resolve_permissions(ids).await),
            None => None,
        };
        let mut roles = self.roles.write().await;

        if let Some(ref new_name) = input.name {
            let name_exists = roles
                .values()
                .any(|r| r.id != id && r.name.to_lowercase() == new_name.to_lowercase());
            if name_exists {
                return Err(RoleError::DuplicateName(new_name.clone()));
            }
        }

        let role = roles.get_mut(&id).ok_or(RoleError::NotFound(id))?;
        role.apply_update(&input, actor);
        if let Some(permissions) = replacement {
            role.permissions = permissions;
        }
        let updated = role.clone();

        tracing::info!(role_id = id, "Updated role");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> RoleResult<bool> {
        let mut roles = self.roles.write().await;

        if roles.remove(&id).is_some() {
            tracing::info!(role_id = id, "Deleted role");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_companies_permission(id: i64) -> Permission {
        Permission {
            id,
            name: "List companies".to_string(),
            api_path: "/api/v1/companies".to_string(),
            method: "GET".to_string(),
            module: "COMPANIES".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: None,
            updated_by: None,
        }
    }

    fn hr_role(permission_ids: Vec<i64>) -> CreateRole {
        CreateRole {
            name: "HR".to_string(),
            description: Some("Human resources".to_string()),
            active: true,
            permission_ids,
        }
    }

    #[tokio::test]
    async fn test_create_role_resolves_known_permissions() {
        let repo =
            InMemoryRoleRepository::with_permissions(vec![fetch_companies_permission(1)]);

        let role = repo.create(hr_role(vec![1, 99]), None).await.unwrap();

        assert_eq!(role.permissions.len(), 1);
        assert_eq!(role.permissions[0].id, 1);
    }

    #[tokio::test]
    async fn test_duplicate_role_name_is_rejected() {
        let repo = InMemoryRoleRepository::new();
        repo.create(hr_role(vec![]), None).await.unwrap();

        let result = repo
            .create(
                CreateRole {
                    name: "hr".to_string(),
                    description: None,
                    active: true,
                    permission_ids: vec![],
                },
                None,
            )
            .await;
        assert!(matches!(result, Err(RoleError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_update_role_replaces_permission_set() {
        let repo = InMemoryRoleRepository::with_permissions(vec![
            fetch_companies_permission(1),
            fetch_companies_permission(2),
        ]);
        let role = repo.create(hr_role(vec![1]), None).await.unwrap();

        let updated = repo
            .update(
                role.id,
                UpdateRole {
                    permission_ids: Some(vec![2]),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated.permissions.len(), 1);
        assert_eq!(updated.permissions[0].id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_permission_triple_is_rejected() {
        let repo = InMemoryPermissionRepository::new();
        repo.create(
            CreatePermission {
                name: "List companies".to_string(),
                api_path: "/api/v1/companies".to_string(),
                method: "GET".to_string(),
                module: "COMPANIES".to_string(),
            },
            None,
        )
        .await
        .unwrap();

        let result = repo
            .create(
                CreatePermission {
                    name: "Fetch companies".to_string(),
                    api_path: "/api/v1/companies".to_string(),
                    method: "get".to_string(),
                    module: "companies".to_string(),
                },
                None,
            )
            .await;
        assert!(matches!(result, Err(PermissionError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_permission_page_with_filter() {
        let repo = InMemoryPermissionRepository::new();
        for (method, path) in [("GET", "/api/v1/jobs"), ("POST", "/api/v1/jobs")] {
            repo.create(
                CreatePermission {
                    name: format!("{} jobs", method),
                    api_path: path.to_string(),
                    method: method.to_string(),
                    module: "JOBS".to_string(),
                },
                None,
            )
            .await
            .unwrap();
        }

        let node = filter_engine::parse("method : 'POST'").unwrap();
        let page = repo
            .find_page(Some(node), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.result[0].method, "POST");
    }

    #[tokio::test]
    async fn test_delete_role() {
        let repo = InMemoryRoleRepository::new();
        let role = repo.create(hr_role(vec![]), None).await.unwrap();

        assert!(repo.delete(role.id).await.unwrap());
        assert!(!repo.delete(role.id).await.unwrap());
    }
}
