use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use filter_engine::FilterNode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{SkillError, SkillResult};
use crate::models::{CreateSkill, Skill, UpdateSkill};

/// Repository trait for Skill persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillRepository: Send + Sync {
    /// Create a new skill
    async fn create(&self, input: CreateSkill, actor: Option<String>) -> SkillResult<Skill>;

    /// Get a skill by ID
    async fn get_by_id(&self, id: i64) -> SkillResult<Option<Skill>>;

    /// List a page of skills matching an optional filter
    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> SkillResult<Page<Skill>>;

    /// Update an existing skill
    async fn update(
        &self,
        id: i64,
        input: UpdateSkill,
        actor: Option<String>,
    ) -> SkillResult<Skill>;

    /// Delete a skill by ID
    async fn delete(&self, id: i64) -> SkillResult<bool>;
}

/// In-memory implementation of SkillRepository (for development/testing)
#[derive(Debug, Default)]
pub struct InMemorySkillRepository {
    skills: Arc<RwLock<HashMap<i64, Skill>>>,
    next_id: AtomicI64,
}

impl InMemorySkillRepository {
    pub fn new() -> Self {
        Self {
            skills: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

/// Evaluate a filter node against a serializable record.
fn filter_matches<T: serde::Serialize>(node: &FilterNode, record: &T) -> SkillResult<bool> {
    let value = serde_json::to_value(record)
        .map_err(|e| SkillError::Internal(format!("Serialization error: {}", e)))?;
    Ok(filter_engine::matches(node, &value)?)
}

#[async_trait]
impl SkillRepository for InMemorySkillRepository {
    async fn create(&self, input: CreateSkill, actor: Option<String>) -> SkillResult<Skill> {
        let mut skills = self.skills.write().await;

        let name_exists = skills
            .values()
            .any(|s| s.name.to_lowercase() == input.name.to_lowercase());
        if name_exists {
            return Err(SkillError::DuplicateName(input.name));
        }

        let skill = Skill {
            id: self.allocate_id(),
            name: input.name,
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: actor,
            updated_by: None,
        };
        skills.insert(skill.id, skill.clone());

        tracing::info!(skill_id = skill.id, "Created skill");
        Ok(skill)
    }

    async fn get_by_id(&self, id: i64) -> SkillResult<Option<Skill>> {
        let skills = self.skills.read().await;
        Ok(skills.get(&id).cloned())
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> SkillResult<Page<Skill>> {
        let skills = self.skills.read().await;

        let mut matching = Vec::new();
        for skill in skills.values() {
            let keep = match &filter {
                Some(node) => filter_matches(node, skill)?,
                None => true,
            };
            if keep {
                matching.push(skill.clone());
            }
        }

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let window: Vec<Skill> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(page, total, window))
    }

    async fn update(
        &self,
        id: i64,
        input: UpdateSkill,
        actor: Option<String>,
    ) -> SkillResult<Skill> {
        let mut skills = self.skills.write().await;

        if let Some(ref new_name) = input.name {
            let name_exists = skills
                .values()
                .any(|s| s.id != id && s.name.to_lowercase() == new_name.to_lowercase());
            if name_exists {
                return Err(SkillError::DuplicateName(new_name.clone()));
            }
        }

        let skill = skills.get_mut(&id).ok_or(SkillError::NotFound(id))?;
        skill.apply_update(input, actor);
        let updated = skill.clone();

        tracing::info!(skill_id = id, "Updated skill");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> SkillResult<bool> {
        let mut skills = self.skills.write().await;

        if skills.remove(&id).is_some() {
            tracing::info!(skill_id = id, "Deleted skill");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rust_skill() -> CreateSkill {
        CreateSkill {
            name: "Rust".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_skill() {
        let repo = InMemorySkillRepository::new();

        let skill = repo.create(rust_skill(), None).await.unwrap();
        assert_eq!(skill.name, "Rust");

        let fetched = repo.get_by_id(skill.id).await.unwrap();
        assert_eq!(fetched.unwrap().name, "Rust");
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected_case_insensitively() {
        let repo = InMemorySkillRepository::new();
        repo.create(rust_skill(), None).await.unwrap();

        let result = repo
            .create(
                CreateSkill {
                    name: "rust".to_string(),
                },
                None,
            )
            .await;
        assert!(matches!(result, Err(SkillError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_update_missing_skill_is_not_found() {
        let repo = InMemorySkillRepository::new();
        let result = repo.update(99, UpdateSkill::default(), None).await;
        assert!(matches!(result, Err(SkillError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_find_page_with_filter() {
        let repo = InMemorySkillRepository::new();
        for name in ["Rust", "Go", "Java"] {
            repo.create(
                CreateSkill {
                    name: name.to_string(),
                },
                None,
            )
            .await
            .unwrap();
        }

        let node = filter_engine::parse("name ~ 'j*'").unwrap();
        let page = repo
            .find_page(Some(node), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.result[0].name, "Java");
    }

    #[tokio::test]
    async fn test_find_page_paginates() {
        let repo = InMemorySkillRepository::new();
        for i in 0..5 {
            repo.create(
                CreateSkill {
                    name: format!("skill-{}", i),
                },
                None,
            )
            .await
            .unwrap();
        }

        let page = repo
            .find_page(None, PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(page.meta.total, 5);
        assert_eq!(page.meta.pages, 3);
        assert_eq!(page.result.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_skill() {
        let repo = InMemorySkillRepository::new();
        let skill = repo.create(rust_skill(), None).await.unwrap();

        assert!(repo.delete(skill.id).await.unwrap());
        assert!(!repo.delete(skill.id).await.unwrap());
    }
}
