use axum_helpers::pagination::{Page, PageQuery};
use std::sync::Arc;
use validator::Validate;

use crate::error::{SubscriberError, SubscriberResult};
use crate::models::{CreateSubscriber, Subscriber, UpdateSubscriber};
use crate::repository::SubscriberRepository;

/// Service layer for Subscriber business logic
#[derive(Clone)]
pub struct SubscriberService<R: SubscriberRepository> {
    repository: Arc<R>,
}

impl<R: SubscriberRepository> SubscriberService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn from_arc(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Register a new subscriber
    pub async fn create_subscriber(
        &self,
        input: CreateSubscriber,
        actor: Option<String>,
    ) -> SubscriberResult<Subscriber> {
        input
            .validate()
            .map_err(|e| SubscriberError::Validation(e.to_string()))?;

        self.repository.create(input, actor).await
    }

    /// Get a subscriber by ID
    pub async fn get_subscriber(&self, id: i64) -> SubscriberResult<Subscriber> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(SubscriberError::NotFound(id))
    }

    /// The subscription profile for an email address, if any
    pub async fn subscription_for_email(
        &self,
        email: &str,
    ) -> SubscriberResult<Option<Subscriber>> {
        self.repository.find_by_email(email).await
    }

    /// List subscribers with pagination and an optional filter expression
    pub async fn list_subscribers(&self, query: &PageQuery) -> SubscriberResult<Page<Subscriber>> {
        let filter = query.filter.as_deref().map(filter_engine::parse).transpose()?;
        self.repository.find_page(filter, query.to_request()).await
    }

    /// All subscribers following at least one skill, for digest delivery
    pub async fn digest_recipients(&self) -> SubscriberResult<Vec<Subscriber>> {
        self.repository.find_all_with_skills().await
    }

    /// Update an existing subscriber
    pub async fn update_subscriber(
        &self,
        id: i64,
        input: UpdateSubscriber,
        actor: Option<String>,
    ) -> SubscriberResult<Subscriber> {
        input
            .validate()
            .map_err(|e| SubscriberError::Validation(e.to_string()))?;

        self.repository.update(id, input, actor).await
    }

    /// Delete a subscriber
    pub async fn delete_subscriber(&self, id: i64) -> SubscriberResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(SubscriberError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockSubscriberRepository;

    fn ada() -> Subscriber {
        Subscriber {
            id: 1,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            skills: Vec::new(),
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: None,
            updated_by: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let mock_repo = MockSubscriberRepository::new();
        let service = SubscriberService::new(mock_repo);

        let result = service
            .create_subscriber(
                CreateSubscriber {
                    email: "not-an-email".to_string(),
                    name: "Ada".to_string(),
                    skill_ids: vec![],
                },
                None,
            )
            .await;

        assert!(matches!(result, Err(SubscriberError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_missing_subscriber_is_not_found() {
        let mut mock_repo = MockSubscriberRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(mockall::predicate::eq(9))
            .returning(|_| Ok(None));

        let service = SubscriberService::new(mock_repo);
        let result = service.get_subscriber(9).await;

        assert!(matches!(result, Err(SubscriberError::NotFound(9))));
    }

    #[tokio::test]
    async fn test_subscription_for_email_passthrough() {
        let mut mock_repo = MockSubscriberRepository::new();
        mock_repo
            .expect_find_by_email()
            .withf(|email| email == "ada@example.com")
            .returning(|_| Ok(Some(ada())));

        let service = SubscriberService::new(mock_repo);
        let found = service
            .subscription_for_email("ada@example.com")
            .await
            .unwrap();
        assert_eq!(found.unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_list_rejects_malformed_filter() {
        let mock_repo = MockSubscriberRepository::new();
        let service = SubscriberService::new(mock_repo);

        let query = PageQuery {
            filter: Some("email :".to_string()),
            ..Default::default()
        };
        let result = service.list_subscribers(&query).await;

        assert!(matches!(result, Err(SubscriberError::MalformedFilter(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_subscriber_is_not_found() {
        let mut mock_repo = MockSubscriberRepository::new();
        mock_repo.expect_delete().returning(|_| Ok(false));

        let service = SubscriberService::new(mock_repo);
        let result = service.delete_subscriber(3).await;

        assert!(matches!(result, Err(SubscriberError::NotFound(3))));
    }
}
