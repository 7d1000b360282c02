use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use database::BaseRepository;
use filter_engine::{to_condition, FilterNode, MapResolver};
use sea_orm::ActiveValue::Set;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use crate::{
    entity,
    error::{CompanyError, CompanyResult},
    models::{Company, CreateCompany, UpdateCompany},
    repository::CompanyRepository,
};

/// Columns exposed to filter expressions.
fn filter_fields() -> MapResolver {
    MapResolver::new(&[
        ("id", "id"),
        ("name", "name"),
        ("description", "description"),
        ("address", "address"),
        ("created_at", "created_at"),
        ("updated_at", "updated_at"),
    ])
}

fn db_err(e: DbErr) -> CompanyError {
    CompanyError::Internal(format!("Database error: {}", e))
}

pub struct MysqlCompanyRepository {
    base: BaseRepository<entity::Entity>,
}

impl MysqlCompanyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl CompanyRepository for MysqlCompanyRepository {
    async fn create(&self, input: CreateCompany, actor: Option<String>) -> CompanyResult<Company> {
        let active_model = entity::new_active_model(input, actor);
        let model = self.base.insert(active_model).await.map_err(db_err)?;

        tracing::info!(company_id = model.id, "Created company");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> CompanyResult<Option<Company>> {
        let model = self.base.find_by_id(id).await.map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> CompanyResult<Page<Company>> {
        let mut query = entity::Entity::find();
        if let Some(node) = &filter {
            query = query.filter(to_condition(node, &filter_fields())?);
        }

        let paginator = query
            .order_by_desc(entity::Column::CreatedAt)
            .paginate(self.base.db(), page.page_size);

        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator.fetch_page(page.page - 1).await.map_err(db_err)?;

        Ok(Page::new(
            page,
            total,
            models.into_iter().map(Into::into).collect(),
        ))
    }

    async fn update(
        &self,
        id: i64,
        input: UpdateCompany,
        actor: Option<String>,
    ) -> CompanyResult<Company> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or(CompanyError::NotFound(id))?;

        let mut company: Company = model.into();
        company.apply_update(input, actor);

        let active_model = entity::ActiveModel {
            id: Set(company.id),
            name: Set(company.name.clone()),
            description: Set(company.description.clone()),
            address: Set(company.address.clone()),
            logo: Set(company.logo.clone()),
            created_at: Set(company.created_at),
            updated_at: Set(company.updated_at),
            created_by: Set(company.created_by.clone()),
            updated_by: Set(company.updated_by.clone()),
        };

        let updated = self.base.update(active_model).await.map_err(db_err)?;

        tracing::info!(company_id = id, "Updated company");
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> CompanyResult<bool> {
        // users.company_id carries ON DELETE CASCADE, removing the
        // company's users together with the company
        let deleted = self.base.delete_by_id(id).await.map_err(db_err)?;

        if deleted {
            tracing::info!(company_id = id, "Deleted company and its users");
        }
        Ok(deleted)
    }
}
