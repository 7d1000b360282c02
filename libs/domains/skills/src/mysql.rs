use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use database::BaseRepository;
use filter_engine::{to_condition, FilterNode, MapResolver};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::{
    entity,
    error::{SkillError, SkillResult},
    models::{CreateSkill, Skill, UpdateSkill},
    repository::SkillRepository,
};

/// Columns exposed to filter expressions.
fn filter_fields() -> MapResolver {
    MapResolver::new(&[
        ("id", "id"),
        ("name", "name"),
        ("created_at", "created_at"),
        ("updated_at", "updated_at"),
    ])
}

fn db_err(e: DbErr) -> SkillError {
    SkillError::Internal(format!("Database error: {}", e))
}

pub struct MysqlSkillRepository {
    base: BaseRepository<entity::Entity>,
}

impl MysqlSkillRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<i64>) -> SkillResult<bool> {
        let mut query = entity::Entity::find().filter(entity::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(entity::Column::Id.ne(id));
        }

        Ok(query
            .one(self.base.db())
            .await
            .map_err(db_err)?
            .is_some())
    }
}

#[async_trait]
impl SkillRepository for MysqlSkillRepository {
    async fn create(&self, input: CreateSkill, actor: Option<String>) -> SkillResult<Skill> {
        if self.name_taken(&input.name, None).await? {
            return Err(SkillError::DuplicateName(input.name));
        }

        let active_model = entity::new_active_model(input, actor);
        let model = self.base.insert(active_model).await.map_err(db_err)?;

        tracing::info!(skill_id = model.id, "Created skill");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> SkillResult<Option<Skill>> {
        let model = self.base.find_by_id(id).await.map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> SkillResult<Page<Skill>> {
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
        input: UpdateSkill,
        actor: Option<String>,
    ) -> SkillResult<Skill> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or(SkillError::NotFound(id))?;

        if let Some(ref new_name) = input.name {
            if self.name_taken(new_name, Some(id)).await? {
                return Err(SkillError::DuplicateName(new_name.clone()));
            }
        }

        let mut skill: Skill = model.into();
        skill.apply_update(input, actor);

        let active_model = entity::ActiveModel {
            id: Set(skill.id),
            name: Set(skill.name.clone()),
            created_at: Set(skill.created_at),
            updated_at: Set(skill.updated_at),
            created_by: Set(skill.created_by.clone()),
            updated_by: Set(skill.updated_by.clone()),
        };

        let updated = self.base.update(active_model).await.map_err(db_err)?;

        tracing::info!(skill_id = id, "Updated skill");
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> SkillResult<bool> {
        let deleted = self.base.delete_by_id(id).await.map_err(db_err)?;

        if deleted {
            tracing::info!(skill_id = id, "Deleted skill");
        }
        Ok(deleted)
    }
}
