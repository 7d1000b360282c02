use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use database::BaseRepository;
use domain_roles::entity::{permission, permission_role, role};
use filter_engine::{to_condition, FilterNode, MapResolver};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use std::collections::HashMap;

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{AuthUser, CompanyRef, CreateUser, RoleRef, UpdateUser, User},
    repository::UserRepository,
};

/// Columns exposed to filter expressions.
fn filter_fields() -> MapResolver {
    MapResolver::new(&[
        ("id", "id"),
        ("name", "name"),
        ("email", "email"),
        ("age", "age"),
        ("gender", "gender"),
        ("address", "address"),
        ("company_id", "company_id"),
        ("role_id", "role_id"),
        ("created_at", "created_at"),
        ("updated_at", "updated_at"),
    ])
}

fn db_err(e: DbErr) -> UserError {
    UserError::Internal(format!("Database error: {}", e))
}

pub struct MysqlUserRepository {
    base: BaseRepository<entity::Entity>,
}

impl MysqlUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn email_taken(&self, email: &str) -> UserResult<bool> {
        Ok(entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(self.base.db())
            .await
            .map_err(db_err)?
            .is_some())
    }

    /// Null out a company reference that does not exist.
    async fn checked_company_id(&self, id: Option<i64>) -> UserResult<Option<i64>> {
        let Some(id) = id else { return Ok(None) };

        let exists = domain_companies::entity::Entity::find_by_id(id)
            .one(self.base.db())
            .await
            .map_err(db_err)?
            .is_some();
        Ok(exists.then_some(id))
    }

    /// Null out a role reference that does not exist.
    async fn checked_role_id(&self, id: Option<i64>) -> UserResult<Option<i64>> {
        let Some(id) = id else { return Ok(None) };

        let exists = role::Entity::find_by_id(id)
            .one(self.base.db())
            .await
            .map_err(db_err)?
            .is_some();
        Ok(exists.then_some(id))
    }

    /// Batch-load company refs keyed by id.
    async fn company_refs(&self, ids: Vec<i64>) -> UserResult<HashMap<i64, CompanyRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let companies = domain_companies::entity::Entity::find()
            .filter(domain_companies::entity::Column::Id.is_in(ids))
            .all(self.base.db())
            .await
            .map_err(db_err)?;
        Ok(companies
            .into_iter()
            .map(|c| {
                (
                    c.id,
                    CompanyRef {
                        id: c.id,
                        name: c.name,
                    },
                )
            })
            .collect())
    }

    /// Batch-load role refs keyed by id.
    async fn role_refs(&self, ids: Vec<i64>) -> UserResult<HashMap<i64, RoleRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let roles = role::Entity::find()
            .filter(role::Column::Id.is_in(ids))
            .all(self.base.db())
            .await
            .map_err(db_err)?;
        Ok(roles
            .into_iter()
            .map(|r| {
                (
                    r.id,
                    RoleRef {
                        id: r.id,
                        name: r.name,
                    },
                )
            })
            .collect())
    }

    /// Resolve references for a single row and build the domain model.
    async fn hydrate(&self, model: entity::Model) -> UserResult<User> {
        let company = match model.company_id {
            Some(id) => self.company_refs(vec![id]).await?.remove(&id),
            None => None,
        };
        let role = match model.role_id {
            Some(id) => self.role_refs(vec![id]).await?.remove(&id),
            None => None,
        };
        Ok(entity::user_from_model(model, company, role))
    }

    /// Load the full role with permissions for the request guard.
    async fn full_role(&self, role_id: Option<i64>) -> UserResult<Option<domain_roles::Role>> {
        let Some(role_id) = role_id else {
            return Ok(None);
        };

        let Some(model) = role::Entity::find_by_id(role_id)
            .one(self.base.db())
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let links = permission_role::Entity::find()
            .filter(permission_role::Column::RoleId.eq(role_id))
            .all(self.base.db())
            .await
            .map_err(db_err)?;
        let permission_ids: Vec<i64> = links.iter().map(|l| l.permission_id).collect();

        let permissions = if permission_ids.is_empty() {
            Vec::new()
        } else {
            permission::Entity::find()
                .filter(permission::Column::Id.is_in(permission_ids))
                .all(self.base.db())
                .await
                .map_err(db_err)?
                .into_iter()
                .map(Into::into)
                .collect()
        };

        Ok(Some(domain_roles::entity::role_with_permissions(
            model,
            permissions,
        )))
    }

    async fn auth_user(&self, model: entity::Model) -> UserResult<AuthUser> {
        let role = self.full_role(model.role_id).await?;
        Ok(AuthUser {
            id: model.id,
            name: model.name,
            email: model.email,
            password_hash: model.password,
            refresh_token: model.refresh_token,
            role,
        })
    }
}

#[async_trait]
impl UserRepository for MysqlUserRepository {
    async fn create(
        &self,
        input: CreateUser,
        password_hash: String,
        actor: Option<String>,
    ) -> UserResult<User> {
        if self.email_taken(&input.email).await? {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let company_id = self.checked_company_id(input.company_id).await?;
        let role_id = self.checked_role_id(input.role_id).await?;

        let active_model =
            entity::new_active_model(&input, password_hash, company_id, role_id, actor);
        let model = self.base.insert(active_model).await.map_err(db_err)?;

        tracing::info!(user_id = model.id, "Created user");
        self.hydrate(model).await
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        match self.base.find_by_id(id).await.map_err(db_err)? {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> UserResult<Page<User>> {
        let mut query = entity::Entity::find();
        if let Some(node) = &filter {
            query = query.filter(to_condition(node, &filter_fields())?);
        }

        let paginator = query
            .order_by_desc(entity::Column::CreatedAt)
            .paginate(self.base.db(), page.page_size);

        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator.fetch_page(page.page - 1).await.map_err(db_err)?;

        let company_ids: Vec<i64> = models.iter().filter_map(|m| m.company_id).collect();
        let role_ids: Vec<i64> = models.iter().filter_map(|m| m.role_id).collect();
        let companies = self.company_refs(company_ids).await?;
        let roles = self.role_refs(role_ids).await?;

        let users = models
            .into_iter()
            .map(|m| {
                let company = m.company_id.and_then(|id| companies.get(&id).cloned());
                let role = m.role_id.and_then(|id| roles.get(&id).cloned());
                entity::user_from_model(m, company, role)
            })
            .collect();

        Ok(Page::new(page, total, users))
    }

    async fn update(&self, id: i64, input: UpdateUser, actor: Option<String>) -> UserResult<User> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or(UserError::NotFound(id))?;

        let company_id = match input.company_id {
            Some(_) => self.checked_company_id(input.company_id).await?,
            None => model.company_id,
        };
        let role_id = match input.role_id {
            Some(_) => self.checked_role_id(input.role_id).await?,
            None => model.role_id,
        };

        let active_model = entity::ActiveModel {
            id: Set(model.id),
            name: Set(input.name.clone().unwrap_or(model.name)),
            email: Set(model.email),
            password: Set(model.password),
            age: Set(input.age.or(model.age)),
            gender: Set(input.gender.map(|g| g.to_string()).or(model.gender)),
            address: Set(input.address.clone().or(model.address)),
            refresh_token: Set(model.refresh_token),
            company_id: Set(company_id),
            role_id: Set(role_id),
            created_at: Set(model.created_at),
            updated_at: Set(Some(chrono::Utc::now())),
            created_by: Set(model.created_by),
            updated_by: Set(actor),
        };

        let updated = self.base.update(active_model).await.map_err(db_err)?;

        tracing::info!(user_id = id, "Updated user");
        self.hydrate(updated).await
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let deleted = self.base.delete_by_id(id).await.map_err(db_err)?;

        if deleted {
            tracing::info!(user_id = id, "Deleted user");
        }
        Ok(deleted)
    }

    async fn find_auth_by_email(&self, email: &str) -> UserResult<Option<AuthUser>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(self.base.db())
            .await
            .map_err(db_err)?;

        match model {
            Some(model) => Ok(Some(self.auth_user(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_refresh_token_and_email(
        &self,
        token: &str,
        email: &str,
    ) -> UserResult<Option<AuthUser>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .filter(entity::Column::RefreshToken.eq(token))
            .one(self.base.db())
            .await
            .map_err(db_err)?;

        match model {
            Some(model) => Ok(Some(self.auth_user(model).await?)),
            None => Ok(None),
        }
    }

    async fn update_refresh_token(&self, user_id: i64, token: Option<String>) -> UserResult<()> {
        let model = self
            .base
            .find_by_id(user_id)
            .await
            .map_err(db_err)?
            .ok_or(UserError::NotFound(user_id))?;

        let mut active_model = model.into_active_model();
        active_model.refresh_token = Set(token);
        self.base.update(active_model).await.map_err(db_err)?;
        Ok(())
    }
}
