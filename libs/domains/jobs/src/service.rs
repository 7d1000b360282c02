use axum_helpers::pagination::{Page, PageQuery};
use std::sync::Arc;
use validator::Validate;

use crate::error::{JobError, JobResult};
use crate::models::{CreateJob, Job, UpdateJob};
use crate::repository::JobRepository;

/// Service layer for Job business logic
#[derive(Clone)]
pub struct JobService<R: JobRepository> {
    repository: Arc<R>,
}

impl<R: JobRepository> JobService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn from_arc(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a new job
    pub async fn create_job(&self, input: CreateJob, actor: Option<String>) -> JobResult<Job> {
        input
            .validate()
            .map_err(|e| JobError::Validation(e.to_string()))?;

        self.repository.create(input, actor).await
    }

    /// Get a job by ID
    pub async fn get_job(&self, id: i64) -> JobResult<Job> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(JobError::NotFound(id))
    }

    /// List jobs with pagination and an optional filter expression
    pub async fn list_jobs(&self, query: &PageQuery) -> JobResult<Page<Job>> {
        let filter = query.filter.as_deref().map(filter_engine::parse).transpose()?;
        self.repository.find_page(filter, query.to_request()).await
    }

    /// Update a job
    pub async fn update_job(
        &self,
        id: i64,
        input: UpdateJob,
        actor: Option<String>,
    ) -> JobResult<Job> {
        input
            .validate()
            .map_err(|e| JobError::Validation(e.to_string()))?;

        self.repository.update(id, input, actor).await
    }

    /// Delete a job
    pub async fn delete_job(&self, id: i64) -> JobResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(JobError::NotFound(id));
        }
        Ok(())
    }

    /// Active jobs requiring any of the given skills
    pub async fn find_active_by_skill_ids(&self, skill_ids: Vec<i64>) -> JobResult<Vec<Job>> {
        self.repository.find_active_by_skill_ids(skill_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockJobRepository;

    #[tokio::test]
    async fn test_get_missing_job_is_not_found() {
        let mut mock_repo = MockJobRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(mockall::predicate::eq(7))
            .returning(|_| Ok(None));

        let service = JobService::new(mock_repo);
        let result = service.get_job(7).await;

        assert!(matches!(result, Err(JobError::NotFound(7))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let mock_repo = MockJobRepository::new();
        let service = JobService::new(mock_repo);

        let result = service
            .create_job(
                CreateJob {
                    name: String::new(),
                    location: None,
                    salary: None,
                    quantity: None,
                    level: None,
                    description: None,
                    start_date: None,
                    end_date: None,
                    active: true,
                    company_id: None,
                    skill_ids: vec![],
                },
                None,
            )
            .await;

        assert!(matches!(result, Err(JobError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_rejects_malformed_filter() {
        let mock_repo = MockJobRepository::new();
        let service = JobService::new(mock_repo);

        let query = PageQuery {
            filter: Some("salary >".to_string()),
            ..Default::default()
        };
        let result = service.list_jobs(&query).await;

        assert!(matches!(result, Err(JobError::MalformedFilter(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_job_is_not_found() {
        let mut mock_repo = MockJobRepository::new();
        mock_repo.expect_delete().returning(|_| Ok(false));

        let service = JobService::new(mock_repo);
        let result = service.delete_job(3).await;

        assert!(matches!(result, Err(JobError::NotFound(3))));
    }
}
