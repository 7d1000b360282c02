use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use filter_engine::FilterNode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ResumeError, ResumeResult};
use crate::models::{CreateResume, JobRef, OwnerRef, Resume, ResumeStatus};

/// Repository trait for Resume persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResumeRepository: Send + Sync {
    /// Create a new resume; the referenced user and job must exist
    async fn create(&self, input: CreateResume, actor: Option<String>) -> ResumeResult<Resume>;

    /// Get a resume by ID
    async fn get_by_id(&self, id: i64) -> ResumeResult<Option<Resume>>;

    /// List a page of resumes matching an optional filter. When
    /// `company_scope` is set, only resumes for that company's jobs appear.
    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
        company_scope: Option<i64>,
    ) -> ResumeResult<Page<Resume>>;

    /// List a page of the given user's resumes
    async fn find_page_by_user(&self, user_id: i64, page: PageRequest)
        -> ResumeResult<Page<Resume>>;

    /// Change the review status of a resume
    async fn update_status(
        &self,
        id: i64,
        status: ResumeStatus,
        actor: Option<String>,
    ) -> ResumeResult<Resume>;

    /// Delete a resume by ID
    async fn delete(&self, id: i64) -> ResumeResult<bool>;
}

/// Entry in the in-memory job catalog, carrying the owning company for
/// scope checks.
#[derive(Debug, Clone)]
pub struct JobCatalogEntry {
    pub id: i64,
    pub name: String,
    pub company_id: Option<i64>,
}

/// In-memory implementation of ResumeRepository (for development/testing)
///
/// Carries user and job catalogs so references can be validated without a
/// database.
#[derive(Debug, Default)]
pub struct InMemoryResumeRepository {
    resumes: Arc<RwLock<HashMap<i64, Resume>>>,
    users: Arc<RwLock<HashMap<i64, OwnerRef>>>,
    jobs: Arc<RwLock<HashMap<i64, JobCatalogEntry>>>,
    next_id: AtomicI64,
}

impl InMemoryResumeRepository {
    pub fn new() -> Self {
        Self::with_catalogs(Vec::new(), Vec::new())
    }

    /// Seed the user and job catalogs used to validate references.
    pub fn with_catalogs(users: Vec<OwnerRef>, jobs: Vec<JobCatalogEntry>) -> Self {
        Self {
            resumes: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(users.into_iter().map(|u| (u.id, u)).collect())),
            jobs: Arc::new(RwLock::new(jobs.into_iter().map(|j| (j.id, j)).collect())),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn page_of(matching: Vec<Resume>, page: PageRequest) -> Page<Resume> {
        let total = matching.len() as u64;
        let window: Vec<Resume> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();
        Page::new(page, total, window)
    }
}

/// Evaluate a filter node against a serializable record.
fn filter_matches<T: serde::Serialize>(node: &FilterNode, record: &T) -> ResumeResult<bool> {
    let value = serde_json::to_value(record)
        .map_err(|e| ResumeError::Internal(format!("Serialization error: {}", e)))?;
    Ok(filter_engine::matches(node, &value)?)
}

fn sort_newest_first(resumes: &mut [Resume]) {
    resumes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl ResumeRepository for InMemoryResumeRepository {
    async fn create(&self, input: CreateResume, actor: Option<String>) -> ResumeResult<Resume> {
        let user = self
            .users
            .read()
            .await
            .get(&input.user_id)
            .cloned()
            .ok_or(ResumeError::UnknownUser(input.user_id))?;
        let job_entry = self
            .jobs
            .read()
            .await
            .get(&input.job_id)
            .cloned()
            .ok_or(ResumeError::UnknownJob(input.job_id))?;

        let mut resumes = self.resumes.write().await;
        let resume = Resume {
            id: self.allocate_id(),
            email: input.email,
            url: input.url,
            status: ResumeStatus::Pending,
            user,
            job: JobRef {
                id: job_entry.id,
                name: job_entry.name,
            },
            company_name: None,
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: actor,
            updated_by: None,
        };
        resumes.insert(resume.id, resume.clone());

        tracing::info!(resume_id = resume.id, "Created resume");
        Ok(resume)
    }

    async fn get_by_id(&self, id: i64) -> ResumeResult<Option<Resume>> {
        let resumes = self.resumes.read().await;
        Ok(resumes.get(&id).cloned())
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
        company_scope: Option<i64>,
    ) -> ResumeResult<Page<Resume>> {
        let scoped_job_ids: Option<Vec<i64>> = match company_scope {
            Some(company_id) => {
                let jobs = self.jobs.read().await;
                Some(
                    jobs.values()
                        .filter(|j| j.company_id == Some(company_id))
                        .map(|j| j.id)
                        .collect(),
                )
            }
            None => None,
        };

        let resumes = self.resumes.read().await;
        let mut matching = Vec::new();
        for resume in resumes.values() {
            if let Some(ref job_ids) = scoped_job_ids {
                if !job_ids.contains(&resume.job.id) {
                    continue;
                }
            }
            let keep = match &filter {
                Some(node) => filter_matches(node, resume)?,
                None => true,
            };
            if keep {
                matching.push(resume.clone());
            }
        }

        sort_newest_first(&mut matching);
        Ok(Self::page_of(matching, page))
    }

    async fn find_page_by_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> ResumeResult<Page<Resume>> {
        let resumes = self.resumes.read().await;

        let mut matching: Vec<Resume> = resumes
            .values()
            .filter(|r| r.user.id == user_id)
            .cloned()
            .collect();

        sort_newest_first(&mut matching);
        Ok(Self::page_of(matching, page))
    }

    async fn update_status(
        &self,
        id: i64,
        status: ResumeStatus,
        actor: Option<String>,
    ) -> ResumeResult<Resume> {
        let mut resumes = self.resumes.write().await;
        let resume = resumes.get_mut(&id).ok_or(ResumeError::NotFound(id))?;

        resume.status = status;
        resume.updated_at = Some(chrono::Utc::now());
        resume.updated_by = actor;
        let updated = resume.clone();

        tracing::info!(resume_id = id, status = %status, "Updated resume status");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> ResumeResult<bool> {
        let mut resumes = self.resumes.write().await;

        if resumes.remove(&id).is_some() {
            tracing::info!(resume_id = id, "Deleted resume");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_repo() -> InMemoryResumeRepository {
        InMemoryResumeRepository::with_catalogs(
            vec![OwnerRef {
                id: 1,
                name: "Ada".to_string(),
            }],
            vec![
                JobCatalogEntry {
                    id: 10,
                    name: "Backend Engineer".to_string(),
                    company_id: Some(100),
                },
                JobCatalogEntry {
                    id: 11,
                    name: "Frontend Engineer".to_string(),
                    company_id: Some(200),
                },
            ],
        )
    }

    fn submission(job_id: i64) -> CreateResume {
        CreateResume {
            email: "ada@example.com".to_string(),
            url: "https://cv.example.com/ada.pdf".to_string(),
            user_id: 1,
            job_id,
        }
    }

    #[tokio::test]
    async fn test_create_starts_pending() {
        let repo = catalog_repo();

        let resume = repo.create(submission(10), None).await.unwrap();
        assert_eq!(resume.status, ResumeStatus::Pending);
        assert_eq!(resume.job.name, "Backend Engineer");
    }

    #[tokio::test]
    async fn test_create_with_unknown_user_is_rejected() {
        let repo = catalog_repo();

        let mut input = submission(10);
        input.user_id = 99;

        let result = repo.create(input, None).await;
        assert!(matches!(result, Err(ResumeError::UnknownUser(99))));
    }

    #[tokio::test]
    async fn test_create_with_unknown_job_is_rejected() {
        let repo = catalog_repo();

        let result = repo.create(submission(99), None).await;
        assert!(matches!(result, Err(ResumeError::UnknownJob(99))));
    }

    #[tokio::test]
    async fn test_company_scope_restricts_listing() {
        let repo = catalog_repo();
        repo.create(submission(10), None).await.unwrap();
        repo.create(submission(11), None).await.unwrap();

        let all = repo
            .find_page(None, PageRequest::default(), None)
            .await
            .unwrap();
        assert_eq!(all.meta.total, 2);

        let scoped = repo
            .find_page(None, PageRequest::default(), Some(100))
            .await
            .unwrap();
        assert_eq!(scoped.meta.total, 1);
        assert_eq!(scoped.result[0].job.id, 10);
    }

    #[tokio::test]
    async fn test_update_status() {
        let repo = catalog_repo();
        let resume = repo.create(submission(10), None).await.unwrap();

        let updated = repo
            .update_status(resume.id, ResumeStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(updated.status, ResumeStatus::Approved);
    }

    #[tokio::test]
    async fn test_find_page_by_user() {
        let repo = catalog_repo();
        repo.create(submission(10), None).await.unwrap();

        let page = repo
            .find_page_by_user(1, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 1);

        let empty = repo
            .find_page_by_user(2, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(empty.meta.total, 0);
    }
}
