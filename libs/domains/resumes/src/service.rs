use async_trait::async_trait;
use axum_helpers::auth::JwtClaims;
use axum_helpers::pagination::{Page, PageQuery};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ResumeError, ResumeResult};
use crate::models::{CreateResume, Resume, UpdateResume};
use crate::repository::ResumeRepository;

/// Downstream notification hook for resume status changes.
///
/// Implementations are best-effort; they log failures and never return
/// errors into the request path.
#[async_trait]
pub trait ResumeNotifier: Send + Sync {
    async fn resume_status_changed(&self, resume: &Resume);
}

/// Resolves the company restriction for a listing user. Returns None when
/// the user may see all resumes.
#[async_trait]
pub trait CompanyScopeResolver: Send + Sync {
    async fn company_scope(&self, user_id: i64) -> Option<i64>;
}

/// Service layer for Resume business logic
#[derive(Clone)]
pub struct ResumeService<R: ResumeRepository> {
    repository: Arc<R>,
    notifier: Option<Arc<dyn ResumeNotifier>>,
    scope_resolver: Option<Arc<dyn CompanyScopeResolver>>,
}

impl<R: ResumeRepository> ResumeService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            notifier: None,
            scope_resolver: None,
        }
    }

    /// Attach the status-change notification hook.
    pub fn with_notifier(mut self, notifier: Arc<dyn ResumeNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Attach the company scope resolver for HR listings.
    pub fn with_scope_resolver(mut self, resolver: Arc<dyn CompanyScopeResolver>) -> Self {
        self.scope_resolver = Some(resolver);
        self
    }

    /// Submit a new resume
    pub async fn create_resume(
        &self,
        input: CreateResume,
        actor: Option<String>,
    ) -> ResumeResult<Resume> {
        input
            .validate()
            .map_err(|e| ResumeError::Validation(e.to_string()))?;

        self.repository.create(input, actor).await
    }

    /// Get a resume by ID
    pub async fn get_resume(&self, id: i64) -> ResumeResult<Resume> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ResumeError::NotFound(id))
    }

    /// List resumes with pagination, an optional filter expression and the
    /// caller's company restriction applied.
    pub async fn list_resumes(
        &self,
        query: &PageQuery,
        claims: Option<&JwtClaims>,
    ) -> ResumeResult<Page<Resume>> {
        let filter = query.filter.as_deref().map(filter_engine::parse).transpose()?;

        let scope = match (claims, &self.scope_resolver) {
            (Some(claims), Some(resolver)) => resolver.company_scope(claims.user.id).await,
            _ => None,
        };

        self.repository
            .find_page(filter, query.to_request(), scope)
            .await
    }

    /// List the calling user's own resumes
    pub async fn my_resumes(&self, user_id: i64, query: &PageQuery) -> ResumeResult<Page<Resume>> {
        self.repository
            .find_page_by_user(user_id, query.to_request())
            .await
    }

    /// Change the review status; the candidate is notified best-effort.
    pub async fn update_resume(
        &self,
        id: i64,
        input: UpdateResume,
        actor: Option<String>,
    ) -> ResumeResult<Resume> {
        let resume = self
            .repository
            .update_status(id, input.status, actor)
            .await?;

        if let Some(notifier) = &self.notifier {
            let notifier = Arc::clone(notifier);
            let snapshot = resume.clone();
            tokio::spawn(async move {
                notifier.resume_status_changed(&snapshot).await;
            });
        }

        Ok(resume)
    }

    /// Delete a resume
    pub async fn delete_resume(&self, id: i64) -> ResumeResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(ResumeError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobRef, OwnerRef, ResumeStatus};
    use crate::repository::MockResumeRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingNotifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ResumeNotifier for CountingNotifier {
        async fn resume_status_changed(&self, _resume: &Resume) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn approved_resume() -> Resume {
        Resume {
            id: 1,
            email: "ada@example.com".to_string(),
            url: "https://cv.example.com/ada.pdf".to_string(),
            status: ResumeStatus::Approved,
            user: OwnerRef {
                id: 1,
                name: "Ada".to_string(),
            },
            job: JobRef {
                id: 10,
                name: "Backend Engineer".to_string(),
            },
            company_name: None,
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: None,
            updated_by: None,
        }
    }

    #[tokio::test]
    async fn test_update_notifies_best_effort() {
        let mut mock_repo = MockResumeRepository::new();
        mock_repo
            .expect_update_status()
            .returning(|_, _, _| Ok(approved_resume()));

        let notifier = Arc::new(CountingNotifier {
            calls: AtomicUsize::new(0),
        });
        let service = ResumeService::new(mock_repo).with_notifier(notifier.clone());

        let resume = service
            .update_resume(
                1,
                UpdateResume {
                    status: ResumeStatus::Approved,
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(resume.status, ResumeStatus::Approved);

        // The notification runs on a spawned task.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_missing_resume_is_not_found() {
        let mut mock_repo = MockResumeRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(mockall::predicate::eq(7))
            .returning(|_| Ok(None));

        let service = ResumeService::new(mock_repo);
        let result = service.get_resume(7).await;

        assert!(matches!(result, Err(ResumeError::NotFound(7))));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let mock_repo = MockResumeRepository::new();
        let service = ResumeService::new(mock_repo);

        let result = service
            .create_resume(
                CreateResume {
                    email: "not-an-email".to_string(),
                    url: "https://cv.example.com/x.pdf".to_string(),
                    user_id: 1,
                    job_id: 1,
                },
                None,
            )
            .await;

        assert!(matches!(result, Err(ResumeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_scope_resolver_restricts_listing() {
        struct FixedScope;

        #[async_trait]
        impl CompanyScopeResolver for FixedScope {
            async fn company_scope(&self, _user_id: i64) -> Option<i64> {
                Some(100)
            }
        }

        let mut mock_repo = MockResumeRepository::new();
        mock_repo
            .expect_find_page()
            .withf(|_, _, scope| *scope == Some(100))
            .returning(|_, page, _| Ok(Page::new(page, 0, Vec::new())));

        let service = ResumeService::new(mock_repo).with_scope_resolver(Arc::new(FixedScope));

        let claims = JwtClaims {
            sub: "hr@example.com".to_string(),
            user: axum_helpers::auth::TokenUser {
                id: 5,
                email: "hr@example.com".to_string(),
                name: "HR".to_string(),
            },
            exp: 0,
            iat: 0,
        };

        let page = service
            .list_resumes(&PageQuery::default(), Some(&claims))
            .await
            .unwrap();
        assert_eq!(page.meta.total, 0);
    }
}
