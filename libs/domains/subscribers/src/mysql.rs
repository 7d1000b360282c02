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
    entity::{self, skill_subscriber, subscriber},
    error::{SubscriberError, SubscriberResult},
    models::{CreateSubscriber, SkillRef, Subscriber, UpdateSubscriber},
    repository::SubscriberRepository,
};

/// Columns exposed to filter expressions.
fn filter_fields() -> MapResolver {
    MapResolver::new(&[
        ("id", "id"),
        ("email", "email"),
        ("name", "name"),
        ("created_at", "created_at"),
        ("updated_at", "updated_at"),
    ])
}

fn db_err(e: DbErr) -> SubscriberError {
    SubscriberError::Internal(format!("Database error: {}", e))
}

#[derive(Clone)]
pub struct MysqlSubscriberRepository {
    base: BaseRepository<subscriber::Entity>,
}

impl MysqlSubscriberRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn email_taken(&self, email: &str) -> SubscriberResult<bool> {
        let existing = subscriber::Entity::find()
            .filter(subscriber::Column::Email.eq(email))
            .one(self.base.db())
            .await
            .map_err(db_err)?;
        Ok(existing.is_some())
    }

    /// Keep only ids that exist in the skills table.
    async fn existing_skills(&self, ids: &[i64]) -> SubscriberResult<Vec<SkillRef>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = domain_skills::entity::Entity::find()
            .filter(domain_skills::entity::Column::Id.is_in(ids.to_vec()))
            .all(self.base.db())
            .await
            .map_err(db_err)?;
        Ok(models
            .into_iter()
            .map(|s| SkillRef {
                id: s.id,
                name: s.name,
            })
            .collect())
    }

    /// Replace the skill_subscriber rows for a subscriber.
    async fn attach_skills(&self, subscriber_id: i64, skills: &[SkillRef]) -> SubscriberResult<()> {
        skill_subscriber::Entity::delete_many()
            .filter(skill_subscriber::Column::SubscriberId.eq(subscriber_id))
            .exec(self.base.db())
            .await
            .map_err(db_err)?;

        if skills.is_empty() {
            return Ok(());
        }

        let rows: Vec<skill_subscriber::ActiveModel> = skills
            .iter()
            .map(|s| skill_subscriber::ActiveModel {
                subscriber_id: Set(subscriber_id),
                skill_id: Set(s.id),
            })
            .collect();
        skill_subscriber::Entity::insert_many(rows)
            .exec(self.base.db())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Batch-load skill refs for a set of subscribers, keyed by subscriber id.
    async fn skills_by_subscriber(
        &self,
        subscriber_ids: &[i64],
    ) -> SubscriberResult<HashMap<i64, Vec<SkillRef>>> {
        if subscriber_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = skill_subscriber::Entity::find()
            .filter(skill_subscriber::Column::SubscriberId.is_in(subscriber_ids.to_vec()))
            .all(self.base.db())
            .await
            .map_err(db_err)?;

        let skill_ids: Vec<i64> = links.iter().map(|l| l.skill_id).collect();
        let skills: HashMap<i64, SkillRef> = self
            .existing_skills(&skill_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut grouped: HashMap<i64, Vec<SkillRef>> = HashMap::new();
        for link in links {
            if let Some(skill) = skills.get(&link.skill_id) {
                grouped
                    .entry(link.subscriber_id)
                    .or_default()
                    .push(skill.clone());
            }
        }
        Ok(grouped)
    }

    /// Resolve the followed skills for a list of rows and build domain models.
    async fn hydrate_all(
        &self,
        models: Vec<subscriber::Model>,
    ) -> SubscriberResult<Vec<Subscriber>> {
        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut skills = self.skills_by_subscriber(&ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let followed = skills.remove(&m.id).unwrap_or_default();
                entity::subscriber_from_model(m, followed)
            })
            .collect())
    }

    async fn hydrate(&self, model: subscriber::Model) -> SubscriberResult<Subscriber> {
        let mut subscribers = self.hydrate_all(vec![model]).await?;
        subscribers
            .pop()
            .ok_or_else(|| SubscriberError::Internal("Hydration dropped the row".to_string()))
    }
}

#[async_trait]
impl SubscriberRepository for MysqlSubscriberRepository {
    async fn create(
        &self,
        input: CreateSubscriber,
        actor: Option<String>,
    ) -> SubscriberResult<Subscriber> {
        if self.email_taken(&input.email).await? {
            return Err(SubscriberError::DuplicateEmail(input.email));
        }

        let skills = self.existing_skills(&input.skill_ids).await?;

        let active_model = subscriber::new_active_model(&input, actor);
        let model = self.base.insert(active_model).await.map_err(db_err)?;

        self.attach_skills(model.id, &skills).await?;

        tracing::info!(subscriber_id = model.id, "Created subscriber");
        self.hydrate(model).await
    }

    async fn get_by_id(&self, id: i64) -> SubscriberResult<Option<Subscriber>> {
        match self.base.find_by_id(id).await.map_err(db_err)? {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> SubscriberResult<Option<Subscriber>> {
        let model = subscriber::Entity::find()
            .filter(subscriber::Column::Email.eq(email))
            .one(self.base.db())
            .await
            .map_err(db_err)?;

        match model {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> SubscriberResult<Page<Subscriber>> {
        let mut query = subscriber::Entity::find();
        if let Some(node) = &filter {
            query = query.filter(to_condition(node, &filter_fields())?);
        }

        let paginator = query
            .order_by_desc(subscriber::Column::CreatedAt)
            .paginate(self.base.db(), page.page_size);

        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator.fetch_page(page.page - 1).await.map_err(db_err)?;

        let subscribers = self.hydrate_all(models).await?;
        Ok(Page::new(page, total, subscribers))
    }

    async fn find_all_with_skills(&self) -> SubscriberResult<Vec<Subscriber>> {
        let linked_ids: Vec<i64> = skill_subscriber::Entity::find()
            .all(self.base.db())
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|l| l.subscriber_id)
            .collect();

        if linked_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = subscriber::Entity::find()
            .filter(subscriber::Column::Id.is_in(linked_ids))
            .all(self.base.db())
            .await
            .map_err(db_err)?;

        let subscribers = self.hydrate_all(models).await?;
        Ok(subscribers
            .into_iter()
            .filter(|s| !s.skills.is_empty())
            .collect())
    }

    async fn update(
        &self,
        id: i64,
        input: UpdateSubscriber,
        actor: Option<String>,
    ) -> SubscriberResult<Subscriber> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or(SubscriberError::NotFound(id))?;

        let mut item = self.hydrate(model).await?;
        item.apply_update(&input, actor);

        if let Some(ref ids) = input.skill_ids {
            item.skills = self.existing_skills(ids).await?;
            self.attach_skills(id, &item.skills).await?;
        }

        let active_model = subscriber::ActiveModel {
            id: Set(item.id),
            email: Set(item.email.clone()),
            name: Set(item.name.clone()),
            created_at: Set(item.created_at),
            updated_at: Set(item.updated_at),
            created_by: Set(item.created_by.clone()),
            updated_by: Set(item.updated_by.clone()),
        };

        let updated = self.base.update(active_model).await.map_err(db_err)?;

        tracing::info!(subscriber_id = id, "Updated subscriber");
        self.hydrate(updated).await
    }

    async fn delete(&self, id: i64) -> SubscriberResult<bool> {
        skill_subscriber::Entity::delete_many()
            .filter(skill_subscriber::Column::SubscriberId.eq(id))
            .exec(self.base.db())
            .await
            .map_err(db_err)?;

        let deleted = self.base.delete_by_id(id).await.map_err(db_err)?;

        if deleted {
            tracing::info!(subscriber_id = id, "Deleted subscriber");
        }
        Ok(deleted)
    }
}
