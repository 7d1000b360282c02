use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use filter_engine::FilterNode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{SubscriberError, SubscriberResult};
use crate::models::{CreateSubscriber, SkillRef, Subscriber, UpdateSubscriber};

/// Repository trait for Subscriber persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Create a new subscriber; unknown skill ids are dropped
    async fn create(
        &self,
        input: CreateSubscriber,
        actor: Option<String>,
    ) -> SubscriberResult<Subscriber>;

    /// Get a subscriber by ID
    async fn get_by_id(&self, id: i64) -> SubscriberResult<Option<Subscriber>>;

    /// Look up a subscriber by email
    async fn find_by_email(&self, email: &str) -> SubscriberResult<Option<Subscriber>>;

    /// List a page of subscribers matching an optional filter
    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> SubscriberResult<Page<Subscriber>>;

    /// All subscribers that follow at least one skill, for digest delivery
    async fn find_all_with_skills(&self) -> SubscriberResult<Vec<Subscriber>>;

    /// Update an existing subscriber
    async fn update(
        &self,
        id: i64,
        input: UpdateSubscriber,
        actor: Option<String>,
    ) -> SubscriberResult<Subscriber>;

    /// Delete a subscriber by ID
    async fn delete(&self, id: i64) -> SubscriberResult<bool>;
}

/// In-memory implementation of SubscriberRepository (for development/testing)
#[derive(Debug, Default)]
pub struct InMemorySubscriberRepository {
    subscribers: Arc<RwLock<HashMap<i64, Subscriber>>>,
    skill_catalog: HashMap<i64, SkillRef>,
    next_id: AtomicI64,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the skill catalog used to resolve `skill_ids`.
    pub fn with_catalog(skills: Vec<SkillRef>) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            skill_catalog: skills.into_iter().map(|s| (s.id, s)).collect(),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Resolve skill ids against the catalog, dropping unknown ids.
    fn resolve_skills(&self, ids: &[i64]) -> Vec<SkillRef> {
        ids.iter()
            .filter_map(|id| self.skill_catalog.get(id).cloned())
            .collect()
    }
}

/// Evaluate a filter node against a serializable record.
fn filter_matches<T: serde::Serialize>(node: &FilterNode, record: &T) -> SubscriberResult<bool> {
    let value = serde_json::to_value(record)
        .map_err(|e| SubscriberError::Internal(format!("Serialization error: {}", e)))?;
    Ok(filter_engine::matches(node, &value)?)
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn create(
        &self,
        input: CreateSubscriber,
        actor: Option<String>,
    ) -> SubscriberResult<Subscriber> {
        let mut subscribers = self.subscribers.write().await;

        let email_exists = subscribers
            .values()
            .any(|s| s.email.eq_ignore_ascii_case(&input.email));
        if email_exists {
            return Err(SubscriberError::DuplicateEmail(input.email));
        }

        let subscriber = Subscriber {
            id: self.allocate_id(),
            email: input.email,
            name: input.name,
            skills: self.resolve_skills(&input.skill_ids),
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: actor,
            updated_by: None,
        };
        subscribers.insert(subscriber.id, subscriber.clone());

        tracing::info!(subscriber_id = subscriber.id, "Created subscriber");
        Ok(subscriber)
    }

    async fn get_by_id(&self, id: i64) -> SubscriberResult<Option<Subscriber>> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> SubscriberResult<Option<Subscriber>> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers
            .values()
            .find(|s| s.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> SubscriberResult<Page<Subscriber>> {
        let subscribers = self.subscribers.read().await;

        let mut matching = Vec::new();
        for subscriber in subscribers.values() {
            let keep = match &filter {
                Some(node) => filter_matches(node, subscriber)?,
                None => true,
            };
            if keep {
                matching.push(subscriber.clone());
            }
        }

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let window: Vec<Subscriber> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(page, total, window))
    }

    async fn find_all_with_skills(&self) -> SubscriberResult<Vec<Subscriber>> {
        let subscribers = self.subscribers.read().await;
        let mut with_skills: Vec<Subscriber> = subscribers
            .values()
            .filter(|s| !s.skills.is_empty())
            .cloned()
            .collect();
        with_skills.sort_by_key(|s| s.id);
        Ok(with_skills)
    }

    async fn update(
        &self,
        id: i64,
        input: UpdateSubscriber,
        actor: Option<String>,
    ) -> SubscriberResult<Subscriber> {
        let replacement_skills = input.skill_ids.as_deref().map(|ids| self.resolve_skills(ids));

        let mut subscribers = self.subscribers.write().await;
        let subscriber = subscribers
            .get_mut(&id)
            .ok_or(SubscriberError::NotFound(id))?;

        subscriber.apply_update(&input, actor);
        if let Some(skills) = replacement_skills {
            subscriber.skills = skills;
        }
        let updated = subscriber.clone();

        tracing::info!(subscriber_id = id, "Updated subscriber");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> SubscriberResult<bool> {
        let mut subscribers = self.subscribers.write().await;

        if subscribers.remove(&id).is_some() {
            tracing::info!(subscriber_id = id, "Deleted subscriber");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<SkillRef> {
        vec![
            SkillRef {
                id: 1,
                name: "Rust".to_string(),
            },
            SkillRef {
                id: 2,
                name: "Go".to_string(),
            },
        ]
    }

    fn ada(skill_ids: Vec<i64>) -> CreateSubscriber {
        CreateSubscriber {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            skill_ids,
        }
    }

    #[tokio::test]
    async fn test_create_resolves_skills_dropping_unknown() {
        let repo = InMemorySubscriberRepository::with_catalog(catalog());

        let subscriber = repo.create(ada(vec![1, 99]), None).await.unwrap();
        assert_eq!(subscriber.skills.len(), 1);
        assert_eq!(subscriber.skills[0].name, "Rust");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_case_insensitively() {
        let repo = InMemorySubscriberRepository::with_catalog(catalog());
        repo.create(ada(vec![]), None).await.unwrap();

        let mut dup = ada(vec![]);
        dup.email = "ADA@example.com".to_string();
        let result = repo.create(dup, None).await;
        assert!(matches!(result, Err(SubscriberError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let repo = InMemorySubscriberRepository::with_catalog(catalog());
        repo.create(ada(vec![1]), None).await.unwrap();

        let found = repo.find_by_email("ada@example.com").await.unwrap();
        assert_eq!(found.unwrap().name, "Ada");

        let missing = repo.find_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_skill_set() {
        let repo = InMemorySubscriberRepository::with_catalog(catalog());
        let subscriber = repo.create(ada(vec![1]), None).await.unwrap();

        let updated = repo
            .update(
                subscriber.id,
                UpdateSubscriber {
                    name: None,
                    skill_ids: Some(vec![2]),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.skills.len(), 1);
        assert_eq!(updated.skills[0].name, "Go");
    }

    #[tokio::test]
    async fn test_find_all_with_skills_skips_empty_follows() {
        let repo = InMemorySubscriberRepository::with_catalog(catalog());
        repo.create(ada(vec![1]), None).await.unwrap();

        let mut empty = ada(vec![]);
        empty.email = "bob@example.com".to_string();
        repo.create(empty, None).await.unwrap();

        let recipients = repo.find_all_with_skills().await.unwrap();
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_delete_subscriber() {
        let repo = InMemorySubscriberRepository::with_catalog(catalog());
        let subscriber = repo.create(ada(vec![]), None).await.unwrap();

        assert!(repo.delete(subscriber.id).await.unwrap());
        assert!(!repo.delete(subscriber.id).await.unwrap());
    }
}
