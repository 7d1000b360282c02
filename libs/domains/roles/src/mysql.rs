use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use database::BaseRepository;
use filter_engine::{to_condition, FilterNode, MapResolver};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use std::collections::HashMap;

use crate::{
    entity::{self, permission, permission_role, role},
    error::{PermissionError, PermissionResult, RoleError, RoleResult},
    models::{CreatePermission, CreateRole, Permission, Role, UpdatePermission, UpdateRole},
    repository::{PermissionRepository, RoleRepository},
};

/// Role columns exposed to filter expressions.
fn role_filter_fields() -> MapResolver {
    MapResolver::new(&[
        ("id", "id"),
        ("name", "name"),
        ("active", "active"),
        ("created_at", "created_at"),
        ("updated_at", "updated_at"),
    ])
}

/// Permission columns exposed to filter expressions.
fn permission_filter_fields() -> MapResolver {
    MapResolver::new(&[
        ("id", "id"),
        ("name", "name"),
        ("api_path", "api_path"),
        ("method", "method"),
        ("module", "module"),
        ("created_at", "created_at"),
        ("updated_at", "updated_at"),
    ])
}

fn role_db_err(e: DbErr) -> RoleError {
    RoleError::Internal(format!("Database error: {}", e))
}

fn permission_db_err(e: DbErr) -> PermissionError {
    PermissionError::Internal(format!("Database error: {}", e))
}

pub struct MysqlPermissionRepository {
    base: BaseRepository<permission::Entity>,
}

impl MysqlPermissionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn triple_taken(
        &self,
        api_path: &str,
        method: &str,
        module: &str,
        exclude_id: Option<i64>,
    ) -> PermissionResult<bool> {
        let mut query = permission::Entity::find()
            .filter(permission::Column::ApiPath.eq(api_path))
            .filter(permission::Column::Method.eq(method))
            .filter(permission::Column::Module.eq(module));
        if let Some(id) = exclude_id {
            query = query.filter(permission::Column::Id.ne(id));
        }

        Ok(query
            .one(self.base.db())
            .await
            .map_err(permission_db_err)?
            .is_some())
    }
}

#[async_trait]
impl PermissionRepository for MysqlPermissionRepository {
    async fn create(
        &self,
        input: CreatePermission,
        actor: Option<String>,
    ) -> PermissionResult<Permission> {
        if self
            .triple_taken(&input.api_path, &input.method, &input.module, None)
            .await?
        {
            return Err(PermissionError::Duplicate {
                api_path: input.api_path,
                method: input.method,
                module: input.module,
            });
        }

        let active_model = permission::new_active_model(input, actor);
        let model = self
            .base
            .insert(active_model)
            .await
            .map_err(permission_db_err)?;

        tracing::info!(permission_id = model.id, "Created permission");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> PermissionResult<Option<Permission>> {
        let model = self.base.find_by_id(id).await.map_err(permission_db_err)?;
        Ok(model.map(Into::into))
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> PermissionResult<Page<Permission>> {
        let mut query = permission::Entity::find();
        if let Some(node) = &filter {
            query = query.filter(to_condition(node, &permission_filter_fields())?);
        }

        let paginator = query
            .order_by_desc(permission::Column::CreatedAt)
            .paginate(self.base.db(), page.page_size);

        let total = paginator.num_items().await.map_err(permission_db_err)?;
        let models = paginator
            .fetch_page(page.page - 1)
            .await
            .map_err(permission_db_err)?;

        Ok(Page::new(
            page,
            total,
            models.into_iter().map(Into::into).collect(),
        ))
    }

    async fn update(
        &self,
        id: i64,
        input: UpdatePermission,
        actor: Option<String>,
    ) -> PermissionResult<Permission> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(permission_db_err)?
            .ok_or(PermissionError::NotFound(id))?;

        let mut item: Permission = model.into();
        item.apply_update(input, actor);

        if self
            .triple_taken(&item.api_path, &item.method, &item.module, Some(id))
            .await?
        {
            return Err(PermissionError::Duplicate {
                api_path: item.api_path,
                method: item.method,
                module: item.module,
            });
        }

        let active_model = permission::ActiveModel {
            id: Set(item.id),
            name: Set(item.name.clone()),
            api_path: Set(item.api_path.clone()),
            method: Set(item.method.clone()),
            module: Set(item.module.clone()),
            created_at: Set(item.created_at),
            updated_at: Set(item.updated_at),
            created_by: Set(item.created_by.clone()),
            updated_by: Set(item.updated_by.clone()),
        };

        let updated = self
            .base
            .update(active_model)
            .await
            .map_err(permission_db_err)?;

        tracing::info!(permission_id = id, "Updated permission");
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> PermissionResult<bool> {
        // Detach from any roles first, the join table has no cascade.
        permission_role::Entity::delete_many()
            .filter(permission_role::Column::PermissionId.eq(id))
            .exec(self.base.db())
            .await
            .map_err(permission_db_err)?;

        let deleted = self.base.delete_by_id(id).await.map_err(permission_db_err)?;

        if deleted {
            tracing::info!(permission_id = id, "Deleted permission");
        }
        Ok(deleted)
    }
}

pub struct MysqlRoleRepository {
    base: BaseRepository<role::Entity>,
}

impl MysqlRoleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<i64>) -> RoleResult<bool> {
        let mut query = role::Entity::find().filter(role::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(role::Column::Id.ne(id));
        }

        Ok(query.one(self.base.db()).await.map_err(role_db_err)?.is_some())
    }

    /// Keep only ids that exist in the permissions table.
    async fn existing_permissions(&self, ids: &[i64]) -> RoleResult<Vec<Permission>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = permission::Entity::find()
            .filter(permission::Column::Id.is_in(ids.to_vec()))
            .all(self.base.db())
            .await
            .map_err(role_db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Replace the permission_role rows for a role.
    async fn attach_permissions(&self, role_id: i64, permissions: &[Permission]) -> RoleResult<()> {
        permission_role::Entity::delete_many()
            .filter(permission_role::Column::RoleId.eq(role_id))
            .exec(self.base.db())
            .await
            .map_err(role_db_err)?;

        if permissions.is_empty() {
            return Ok(());
        }

        let rows: Vec<permission_role::ActiveModel> = permissions
            .iter()
            .map(|p| permission_role::ActiveModel {
                role_id: Set(role_id),
                permission_id: Set(p.id),
            })
            .collect();
        permission_role::Entity::insert_many(rows)
            .exec(self.base.db())
            .await
            .map_err(role_db_err)?;
        Ok(())
    }

    /// Batch-load permissions for a set of roles, keyed by role id.
    async fn permissions_by_role(
        &self,
        role_ids: &[i64],
    ) -> RoleResult<HashMap<i64, Vec<Permission>>> {
        if role_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = permission_role::Entity::find()
            .filter(permission_role::Column::RoleId.is_in(role_ids.to_vec()))
            .all(self.base.db())
            .await
            .map_err(role_db_err)?;

        let permission_ids: Vec<i64> = links.iter().map(|l| l.permission_id).collect();
        let permissions: HashMap<i64, Permission> = self
            .existing_permissions(&permission_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut grouped: HashMap<i64, Vec<Permission>> = HashMap::new();
        for link in links {
            if let Some(permission) = permissions.get(&link.permission_id) {
                grouped
                    .entry(link.role_id)
                    .or_default()
                    .push(permission.clone());
            }
        }
        Ok(grouped)
    }
}

#[async_trait]
impl RoleRepository for MysqlRoleRepository {
    async fn create(&self, input: CreateRole, actor: Option<String>) -> RoleResult<Role> {
        if self.name_taken(&input.name, None).await? {
            return Err(RoleError::DuplicateName(input.name));
        }

        let permissions = self.existing_permissions(&input.permission_ids).await?;

        let active_model = role::new_active_model(&input, actor);
        let model = self.base.insert(active_model).await.map_err(role_db_err)?;

        self.attach_permissions(model.id, &permissions).await?;

        tracing::info!(role_id = model.id, "Created role");
        Ok(entity::role_with_permissions(model, permissions))
    }

    async fn get_by_id(&self, id: i64) -> RoleResult<Option<Role>> {
        let Some(model) = self.base.find_by_id(id).await.map_err(role_db_err)? else {
            return Ok(None);
        };

        let mut grouped = self.permissions_by_role(&[id]).await?;
        let permissions = grouped.remove(&id).unwrap_or_default();
        Ok(Some(entity::role_with_permissions(model, permissions)))
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> RoleResult<Page<Role>> {
        let mut query = role::Entity::find();
        if let Some(node) = &filter {
            query = query.filter(to_condition(node, &role_filter_fields())?);
        }

        let paginator = query
            .order_by_desc(role::Column::CreatedAt)
            .paginate(self.base.db(), page.page_size);

        let total = paginator.num_items().await.map_err(role_db_err)?;
        let models = paginator.fetch_page(page.page - 1).await.map_err(role_db_err)?;

        let role_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut grouped = self.permissions_by_role(&role_ids).await?;

        let roles = models
            .into_iter()
            .map(|m| {
                let permissions = grouped.remove(&m.id).unwrap_or_default();
                entity::role_with_permissions(m, permissions)
            })
            .collect();

        Ok(Page::new(page, total, roles))
    }

    async fn update(&self, id: i64, input: UpdateRole, actor: Option<String>) -> RoleResult<Role> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(role_db_err)?
            .ok_or(RoleError::NotFound(id))?;

        if let Some(ref new_name) = input.name {
            if self.name_taken(new_name, Some(id)).await? {
                return Err(RoleError::DuplicateName(new_name.clone()));
            }
        }

        let mut grouped = self.permissions_by_role(&[id]).await?;
        let mut item = entity::role_with_permissions(model, grouped.remove(&id).unwrap_or_default());
        item.apply_update(&input, actor);

        if let Some(ref ids) = input.permission_ids {
            item.permissions = self.existing_permissions(ids).await?;
            self.attach_permissions(id, &item.permissions).await?;
        }

        let active_model = role::ActiveModel {
            id: Set(item.id),
            name: Set(item.name.clone()),
            description: Set(item.description.clone()),
            active: Set(item.active),
            created_at: Set(item.created_at),
            updated_at: Set(item.updated_at),
            created_by: Set(item.created_by.clone()),
            updated_by: Set(item.updated_by.clone()),
        };

        let updated = self.base.update(active_model).await.map_err(role_db_err)?;

        tracing::info!(role_id = id, "Updated role");
        Ok(entity::role_with_permissions(updated, item.permissions))
    }

    async fn delete(&self, id: i64) -> RoleResult<bool> {
        permission_role::Entity::delete_many()
            .filter(permission_role::Column::RoleId.eq(id))
            .exec(self.base.db())
            .await
            .map_err(role_db_err)?;

        let deleted = self.base.delete_by_id(id).await.map_err(role_db_err)?;

        if deleted {
            tracing::info!(role_id = id, "Deleted role");
        }
        Ok(deleted)
    }
}
