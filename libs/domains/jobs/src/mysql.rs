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
    entity::{self, job, job_skill},
    error::{JobError, JobResult},
    models::{CompanyRef, CreateJob, Job, SkillRef, UpdateJob},
    repository::JobRepository,
};

/// Columns exposed to filter expressions.
fn filter_fields() -> MapResolver {
    MapResolver::new(&[
        ("id", "id"),
        ("name", "name"),
        ("location", "location"),
        ("salary", "salary"),
        ("quantity", "quantity"),
        ("level", "level"),
        ("active", "active"),
        ("company_id", "company_id"),
        ("start_date", "start_date"),
        ("end_date", "end_date"),
        ("created_at", "created_at"),
        ("updated_at", "updated_at"),
    ])
}

fn db_err(e: DbErr) -> JobError {
    JobError::Internal(format!("Database error: {}", e))
}

#[derive(Clone)]
pub struct MysqlJobRepository {
    base: BaseRepository<job::Entity>,
}

impl MysqlJobRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Null out a company reference that does not exist.
    async fn checked_company_id(&self, id: Option<i64>) -> JobResult<Option<i64>> {
        let Some(id) = id else { return Ok(None) };

        let exists = domain_companies::entity::Entity::find_by_id(id)
            .one(self.base.db())
            .await
            .map_err(db_err)?
            .is_some();
        Ok(exists.then_some(id))
    }

    /// Keep only ids that exist in the skills table.
    async fn existing_skills(&self, ids: &[i64]) -> JobResult<Vec<SkillRef>> {
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

    /// Replace the job_skill rows for a job.
    async fn attach_skills(&self, job_id: i64, skills: &[SkillRef]) -> JobResult<()> {
        job_skill::Entity::delete_many()
            .filter(job_skill::Column::JobId.eq(job_id))
            .exec(self.base.db())
            .await
            .map_err(db_err)?;

        if skills.is_empty() {
            return Ok(());
        }

        let rows: Vec<job_skill::ActiveModel> = skills
            .iter()
            .map(|s| job_skill::ActiveModel {
                job_id: Set(job_id),
                skill_id: Set(s.id),
            })
            .collect();
        job_skill::Entity::insert_many(rows)
            .exec(self.base.db())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Batch-load skill refs for a set of jobs, keyed by job id.
    async fn skills_by_job(&self, job_ids: &[i64]) -> JobResult<HashMap<i64, Vec<SkillRef>>> {
        if job_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = job_skill::Entity::find()
            .filter(job_skill::Column::JobId.is_in(job_ids.to_vec()))
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
                grouped.entry(link.job_id).or_default().push(skill.clone());
            }
        }
        Ok(grouped)
    }

    /// Batch-load company refs keyed by id.
    async fn company_refs(&self, ids: Vec<i64>) -> JobResult<HashMap<i64, CompanyRef>> {
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

    /// Resolve references for a list of rows and build domain models.
    async fn hydrate_all(&self, models: Vec<job::Model>) -> JobResult<Vec<Job>> {
        let job_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let company_ids: Vec<i64> = models.iter().filter_map(|m| m.company_id).collect();

        let mut skills = self.skills_by_job(&job_ids).await?;
        let companies = self.company_refs(company_ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let company = m.company_id.and_then(|id| companies.get(&id).cloned());
                let job_skills = skills.remove(&m.id).unwrap_or_default();
                entity::job_from_model(m, company, job_skills)
            })
            .collect())
    }

    async fn hydrate(&self, model: job::Model) -> JobResult<Job> {
        let mut jobs = self.hydrate_all(vec![model]).await?;
        jobs.pop()
            .ok_or_else(|| JobError::Internal("Hydration dropped the row".to_string()))
    }
}

#[async_trait]
impl JobRepository for MysqlJobRepository {
    async fn create(&self, input: CreateJob, actor: Option<String>) -> JobResult<Job> {
        let company_id = self.checked_company_id(input.company_id).await?;
        let skills = self.existing_skills(&input.skill_ids).await?;

        let active_model = job::new_active_model(&input, company_id, actor);
        let model = self.base.insert(active_model).await.map_err(db_err)?;

        self.attach_skills(model.id, &skills).await?;

        tracing::info!(job_id = model.id, "Created job");
        self.hydrate(model).await
    }

    async fn get_by_id(&self, id: i64) -> JobResult<Option<Job>> {
        match self.base.find_by_id(id).await.map_err(db_err)? {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> JobResult<Page<Job>> {
        let mut query = job::Entity::find();
        if let Some(node) = &filter {
            query = query.filter(to_condition(node, &filter_fields())?);
        }

        let paginator = query
            .order_by_desc(job::Column::CreatedAt)
            .paginate(self.base.db(), page.page_size);

        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator.fetch_page(page.page - 1).await.map_err(db_err)?;

        let jobs = self.hydrate_all(models).await?;
        Ok(Page::new(page, total, jobs))
    }

    async fn update(&self, id: i64, input: UpdateJob, actor: Option<String>) -> JobResult<Job> {
        let model = self
            .base
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or(JobError::NotFound(id))?;

        let company_id = match input.company_id {
            Some(_) => self.checked_company_id(input.company_id).await?,
            None => model.company_id,
        };

        let mut item = self.hydrate(model).await?;
        item.apply_update(&input, actor);

        if let Some(ref ids) = input.skill_ids {
            item.skills = self.existing_skills(ids).await?;
            self.attach_skills(id, &item.skills).await?;
        }

        let active_model = job::ActiveModel {
            id: Set(item.id),
            name: Set(item.name.clone()),
            location: Set(item.location.clone()),
            salary: Set(item.salary),
            quantity: Set(item.quantity),
            level: Set(item.level.map(|l| l.to_string())),
            description: Set(item.description.clone()),
            start_date: Set(item.start_date),
            end_date: Set(item.end_date),
            active: Set(item.active),
            company_id: Set(company_id),
            created_at: Set(item.created_at),
            updated_at: Set(item.updated_at),
            created_by: Set(item.created_by.clone()),
            updated_by: Set(item.updated_by.clone()),
        };

        let updated = self.base.update(active_model).await.map_err(db_err)?;

        tracing::info!(job_id = id, "Updated job");
        self.hydrate(updated).await
    }

    async fn delete(&self, id: i64) -> JobResult<bool> {
        job_skill::Entity::delete_many()
            .filter(job_skill::Column::JobId.eq(id))
            .exec(self.base.db())
            .await
            .map_err(db_err)?;

        let deleted = self.base.delete_by_id(id).await.map_err(db_err)?;

        if deleted {
            tracing::info!(job_id = id, "Deleted job");
        }
        Ok(deleted)
    }

    async fn find_active_by_skill_ids(&self, skill_ids: Vec<i64>) -> JobResult<Vec<Job>> {
        if skill_ids.is_empty() {
            return Ok(Vec::new());
        }

        let links = job_skill::Entity::find()
            .filter(job_skill::Column::SkillId.is_in(skill_ids))
            .all(self.base.db())
            .await
            .map_err(db_err)?;

        let mut job_ids: Vec<i64> = links.into_iter().map(|l| l.job_id).collect();
        job_ids.sort_unstable();
        job_ids.dedup();
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = job::Entity::find()
            .filter(job::Column::Id.is_in(job_ids))
            .filter(job::Column::Active.eq(true))
            .all(self.base.db())
            .await
            .map_err(db_err)?;

        self.hydrate_all(models).await
    }
}
