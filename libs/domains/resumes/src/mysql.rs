use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use database::BaseRepository;
use domain_jobs::entity::job;
use filter_engine::{to_condition, FilterNode, MapResolver};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;

use crate::{
    entity,
    error::{ResumeError, ResumeResult},
    models::{CreateResume, JobRef, OwnerRef, Resume, ResumeStatus},
    repository::ResumeRepository,
};

/// Columns exposed to filter expressions.
fn filter_fields() -> MapResolver {
    MapResolver::new(&[
        ("id", "id"),
        ("email", "email"),
        ("status", "status"),
        ("user_id", "user_id"),
        ("job_id", "job_id"),
        ("created_at", "created_at"),
        ("updated_at", "updated_at"),
    ])
}

fn db_err(e: DbErr) -> ResumeError {
    ResumeError::Internal(format!("Database error: {}", e))
}

pub struct MysqlResumeRepository {
    base: BaseRepository<entity::Entity>,
}

impl MysqlResumeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Batch-load owner refs keyed by user id.
    async fn owner_refs(&self, ids: Vec<i64>) -> ResumeResult<HashMap<i64, OwnerRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = domain_users::entity::Entity::find()
            .filter(domain_users::entity::Column::Id.is_in(ids))
            .all(self.base.db())
            .await
            .map_err(db_err)?;
        Ok(users
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    OwnerRef {
                        id: u.id,
                        name: u.name,
                    },
                )
            })
            .collect())
    }

    /// Batch-load jobs with their company names keyed by job id.
    async fn job_refs(
        &self,
        ids: Vec<i64>,
    ) -> ResumeResult<HashMap<i64, (JobRef, Option<String>)>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let jobs = job::Entity::find()
            .filter(job::Column::Id.is_in(ids))
            .all(self.base.db())
            .await
            .map_err(db_err)?;

        let company_ids: Vec<i64> = jobs.iter().filter_map(|j| j.company_id).collect();
        let companies: HashMap<i64, String> = if company_ids.is_empty() {
            HashMap::new()
        } else {
            domain_companies::entity::Entity::find()
                .filter(domain_companies::entity::Column::Id.is_in(company_ids))
                .all(self.base.db())
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };

        Ok(jobs
            .into_iter()
            .map(|j| {
                let company_name = j.company_id.and_then(|id| companies.get(&id).cloned());
                (
                    j.id,
                    (
                        JobRef {
                            id: j.id,
                            name: j.name,
                        },
                        company_name,
                    ),
                )
            })
            .collect())
    }

    /// Resolve references for a list of rows and build domain models.
    /// Rows pointing at deleted users or jobs are dropped.
    async fn hydrate_all(&self, models: Vec<entity::Model>) -> ResumeResult<Vec<Resume>> {
        let user_ids: Vec<i64> = models.iter().map(|m| m.user_id).collect();
        let job_ids: Vec<i64> = models.iter().map(|m| m.job_id).collect();

        let owners = self.owner_refs(user_ids).await?;
        let jobs = self.job_refs(job_ids).await?;

        Ok(models
            .into_iter()
            .filter_map(|m| {
                let owner = owners.get(&m.user_id).cloned()?;
                let (job_ref, company_name) = jobs.get(&m.job_id).cloned()?;
                Some(entity::resume_from_model(m, owner, job_ref, company_name))
            })
            .collect())
    }

    async fn hydrate(&self, model: entity::Model) -> ResumeResult<Resume> {
        let mut resumes = self.hydrate_all(vec![model]).await?;
        resumes
            .pop()
            .ok_or_else(|| ResumeError::Internal("Resume references a deleted row".to_string()))
    }

    /// Job ids belonging to a company, for HR scope restriction.
    async fn company_job_ids(&self, company_id: i64) -> ResumeResult<Vec<i64>> {
        let ids = job::Entity::find()
            .select_only()
            .column(job::Column::Id)
            .filter(job::Column::CompanyId.eq(company_id))
            .into_tuple::<i64>()
            .all(self.base.db())
            .await
            .map_err(db_err)?;
        Ok(ids)
    }

    async fn fetch_page(
        &self,
        condition: Condition,
        page: PageRequest,
    ) -> ResumeResult<Page<Resume>> {
        let paginator = entity::Entity::find()
            .filter(condition)
            .order_by_desc(entity::Column::CreatedAt)
            .paginate(self.base.db(), page.page_size);

        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator.fetch_page(page.page - 1).await.map_err(db_err)?;

        let resumes = self.hydrate_all(models).await?;
        Ok(Page::new(page, total, resumes))
    }
}

#[async_trait]
impl ResumeRepository for MysqlResumeRepository {
    async fn create(&self, input: CreateResume, actor: Option<String>) -> ResumeResult<Resume> {
        let user_exists = domain_users::entity::Entity::find_by_id(input.user_id)
            .one(self.base.db())
            .await
            .map_err(db_err)?
            .is_some();
        if !user_exists {
            return Err(ResumeError::UnknownUser(input.user_id));
        }

        let job_exists = job::Entity::find_by_id(input.job_id)
            .one(self.base.db())
            .await
            .map_err(db_err)?
            .is_some();
        if !job_exists {
            return Err(ResumeError::UnknownJob(input.job_id));
        }

        let active_model = entity::new_active_model(&input, actor);
        let model = self.base.insert(active_model).await.map_err(db_err)?;

        tracing::info!(resume_id = model.id, "Created resume");
        self.hydrate(model).await
    }

    async fn get_by_id(&self, id: i64) -> ResumeResult<Option<Resume>> {
        match self.base.find_by_id(id).await.map_err(db_err)? {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
        company_scope: Option<i64>,
    ) -> ResumeResult<Page<Resume>> {
        let mut condition = Condition::all();
        if let Some(node) = &filter {
            condition = condition.add(to_condition(node, &filter_fields())?);
        }
        if let Some(company_id) = company_scope {
            let job_ids = self.company_job_ids(company_id).await?;
            condition = condition.add(entity::Column::JobId.is_in(job_ids));
        }

        self.fetch_page(condition, page).await
    }

    async fn find_page_by_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> ResumeResult<Page<Resume>> {
        let condition = Condition::all().add(entity::Column::UserId.eq(user_id));
        self.fetch_page(condition, page).await
    }

    async fn update_status(
        &self,
        id: i64,
        status: ResumeStatus,
        actor: Option<String>,
    ) -> ResumeResult<Resume> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or(ResumeError::NotFound(id))?;

        let mut active_model = model.into_active_model();
        active_model.status = Set(status.to_string());
        active_model.updated_at = Set(Some(chrono::Utc::now()));
        active_model.updated_by = Set(actor);

        let updated = self.base.update(active_model).await.map_err(db_err)?;

        tracing::info!(resume_id = id, status = %status, "Updated resume status");
        self.hydrate(updated).await
    }

    async fn delete(&self, id: i64) -> ResumeResult<bool> {
        let deleted = self.base.delete_by_id(id).await.map_err(db_err)?;

        if deleted {
            tracing::info!(resume_id = id, "Deleted resume");
        }
        Ok(deleted)
    }
}
