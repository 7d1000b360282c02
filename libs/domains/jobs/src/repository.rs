use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use filter_engine::FilterNode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{JobError, JobResult};
use crate::models::{CompanyRef, CreateJob, Job, SkillRef, UpdateJob};

/// Repository trait for Job persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Create a new job. Unknown skill and company ids are dropped.
    async fn create(&self, input: CreateJob, actor: Option<String>) -> JobResult<Job>;

    /// Get a job with its skills by ID
    async fn get_by_id(&self, id: i64) -> JobResult<Option<Job>>;

    /// List a page of jobs matching an optional filter
    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> JobResult<Page<Job>>;

    /// Update an existing job. A present skill_ids list replaces the set.
    async fn update(&self, id: i64, input: UpdateJob, actor: Option<String>) -> JobResult<Job>;

    /// Delete a job by ID
    async fn delete(&self, id: i64) -> JobResult<bool>;

    /// Active jobs requiring any of the given skills, for subscriber digests
    async fn find_active_by_skill_ids(&self, skill_ids: Vec<i64>) -> JobResult<Vec<Job>>;
}

/// In-memory implementation of JobRepository (for development/testing)
///
/// Carries company and skill catalogs so references can be resolved without
/// a database.
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    jobs: Arc<RwLock<HashMap<i64, Job>>>,
    companies: Arc<RwLock<HashMap<i64, CompanyRef>>>,
    skills: Arc<RwLock<HashMap<i64, SkillRef>>>,
    next_id: AtomicI64,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::with_catalogs(Vec::new(), Vec::new())
    }

    /// Seed the company and skill catalogs used to resolve references.
    pub fn with_catalogs(companies: Vec<CompanyRef>, skills: Vec<SkillRef>) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            companies: Arc::new(RwLock::new(
                companies.into_iter().map(|c| (c.id, c)).collect(),
            )),
            skills: Arc::new(RwLock::new(skills.into_iter().map(|s| (s.id, s)).collect())),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn resolve_skills(&self, ids: &[i64]) -> Vec<SkillRef> {
        let skills = self.skills.read().await;
        ids.iter().filter_map(|id| skills.get(id).cloned()).collect()
    }
}

/// Evaluate a filter node against a serializable record.
fn filter_matches<T: serde::Serialize>(node: &FilterNode, record: &T) -> JobResult<bool> {
    let value = serde_json::to_value(record)
        .map_err(|e| JobError::Internal(format!("Serialization error: {}", e)))?;
    Ok(filter_engine::matches(node, &value)?)
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, input: CreateJob, actor: Option<String>) -> JobResult<Job> {
        let skills = self.resolve_skills(&input.skill_ids).await;
        let company = match input.company_id {
            Some(id) => self.companies.read().await.get(&id).cloned(),
            None => None,
        };

        let mut jobs = self.jobs.write().await;
        let job = Job {
            id: self.allocate_id(),
            name: input.name,
            location: input.location,
            salary: input.salary,
            quantity: input.quantity,
            level: input.level,
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date,
            active: input.active,
            company,
            skills,
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: actor,
            updated_by: None,
        };
        jobs.insert(job.id, job.clone());

        tracing::info!(job_id = job.id, "Created job");
        Ok(job)
    }

    async fn get_by_id(&self, id: i64) -> JobResult<Option<Job>> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(&id).cloned())
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> JobResult<Page<Job>> {
        let jobs = self.jobs.read().await;

        let mut matching = Vec::new();
        for job in jobs.values() {
            let keep = match &filter {
                Some(node) => filter_matches(node, job)?,
                None => true,
            };
            if keep {
                matching.push(job.clone());
            }
        }

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let window: Vec<Job> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(page, total, window))
    }

    async fn update(&self, id: i64, input: UpdateJob, actor: Option<String>) -> JobResult<Job> {
        let replacement = match &input.skill_ids {
            Some(ids) => Some(self.resolve_skills(ids).await),
            None => None,
        };
        let company = match input.company_id {
            Some(id) => self.companies.read().await.get(&id).cloned(),
            None => None,
        };

        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(JobError::NotFound(id))?;

        job.apply_update(&input, actor);
        if let Some(skills) = replacement {
            job.skills = skills;
        }
        if input.company_id.is_some() {
            job.company = company;
        }
        let updated = job.clone();

        tracing::info!(job_id = id, "Updated job");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> JobResult<bool> {
        let mut jobs = self.jobs.write().await;

        if jobs.remove(&id).is_some() {
            tracing::info!(job_id = id, "Deleted job");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn find_active_by_skill_ids(&self, skill_ids: Vec<i64>) -> JobResult<Vec<Job>> {
        let jobs = self.jobs.read().await;

        let mut matching: Vec<Job> = jobs
            .values()
            .filter(|j| j.active && j.skills.iter().any(|s| skill_ids.contains(&s.id)))
            .cloned()
            .collect();
        matching.sort_by_key(|j| j.id);

        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobLevel;

    fn rust_skill() -> SkillRef {
        SkillRef {
            id: 1,
            name: "Rust".to_string(),
        }
    }

    fn backend_job(skill_ids: Vec<i64>) -> CreateJob {
        CreateJob {
            name: "Backend Engineer".to_string(),
            location: Some("Hanoi".to_string()),
            salary: Some(2500.0),
            quantity: Some(2),
            level: Some(JobLevel::Senior),
            description: None,
            start_date: None,
            end_date: None,
            active: true,
            company_id: None,
            skill_ids,
        }
    }

    #[tokio::test]
    async fn test_create_resolves_known_skills() {
        let repo = InMemoryJobRepository::with_catalogs(Vec::new(), vec![rust_skill()]);

        let job = repo.create(backend_job(vec![1, 99]), None).await.unwrap();

        assert_eq!(job.skills.len(), 1);
        assert_eq!(job.skills[0].name, "Rust");
    }

    #[tokio::test]
    async fn test_update_replaces_skill_set() {
        let repo = InMemoryJobRepository::with_catalogs(
            Vec::new(),
            vec![
                rust_skill(),
                SkillRef {
                    id: 2,
                    name: "Go".to_string(),
                },
            ],
        );
        let job = repo.create(backend_job(vec![1]), None).await.unwrap();

        let updated = repo
            .update(
                job.id,
                UpdateJob {
                    skill_ids: Some(vec![2]),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated.skills.len(), 1);
        assert_eq!(updated.skills[0].name, "Go");
    }

    #[tokio::test]
    async fn test_find_active_by_skill_ids_skips_inactive() {
        let repo = InMemoryJobRepository::with_catalogs(Vec::new(), vec![rust_skill()]);
        repo.create(backend_job(vec![1]), None).await.unwrap();

        let mut inactive = backend_job(vec![1]);
        inactive.name = "Closed position".to_string();
        inactive.active = false;
        repo.create(inactive, None).await.unwrap();

        let jobs = repo.find_active_by_skill_ids(vec![1]).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "Backend Engineer");
    }

    #[tokio::test]
    async fn test_find_page_filters_on_level() {
        let repo = InMemoryJobRepository::new();
        repo.create(backend_job(vec![]), None).await.unwrap();

        let mut junior = backend_job(vec![]);
        junior.name = "Junior Engineer".to_string();
        junior.level = Some(JobLevel::Junior);
        repo.create(junior, None).await.unwrap();

        let node = filter_engine::parse("level : 'JUNIOR'").unwrap();
        let page = repo
            .find_page(Some(node), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.result[0].name, "Junior Engineer");
    }
}
