use axum_helpers::pagination::{Page, PageQuery};
use std::sync::Arc;
use validator::Validate;

use crate::error::{SkillError, SkillResult};
use crate::models::{CreateSkill, Skill, UpdateSkill};
use crate::repository::SkillRepository;

/// Service layer for Skill business logic
#[derive(Clone)]
pub struct SkillService<R: SkillRepository> {
    repository: Arc<R>,
}

impl<R: SkillRepository> SkillService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new skill
    pub async fn create_skill(
        &self,
        input: CreateSkill,
        actor: Option<String>,
    ) -> SkillResult<Skill> {
        input
            .validate()
            .map_err(|e| SkillError::Validation(e.to_string()))?;

        self.repository.create(input, actor).await
    }

    /// Get a skill by ID
    pub async fn get_skill(&self, id: i64) -> SkillResult<Skill> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(SkillError::NotFound(id))
    }

    /// List skills with pagination and an optional filter expression
    pub async fn list_skills(&self, query: &PageQuery) -> SkillResult<Page<Skill>> {
        let filter = query.filter.as_deref().map(filter_engine::parse).transpose()?;
        self.repository.find_page(filter, query.to_request()).await
    }

    /// Update a skill
    pub async fn update_skill(
        &self,
        id: i64,
        input: UpdateSkill,
        actor: Option<String>,
    ) -> SkillResult<Skill> {
        input
            .validate()
            .map_err(|e| SkillError::Validation(e.to_string()))?;

        self.repository.update(id, input, actor).await
    }

    /// Delete a skill
    pub async fn delete_skill(&self, id: i64) -> SkillResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(SkillError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockSkillRepository;

    #[tokio::test]
    async fn test_get_missing_skill_is_not_found() {
        let mut mock_repo = MockSkillRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(mockall::predicate::eq(7))
            .returning(|_| Ok(None));

        let service = SkillService::new(mock_repo);
        let result = service.get_skill(7).await;

        assert!(matches!(result, Err(SkillError::NotFound(7))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let mock_repo = MockSkillRepository::new();
        let service = SkillService::new(mock_repo);

        let result = service
            .create_skill(
                CreateSkill {
                    name: String::new(),
                },
                None,
            )
            .await;

        assert!(matches!(result, Err(SkillError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_rejects_malformed_filter() {
        let mock_repo = MockSkillRepository::new();
        let service = SkillService::new(mock_repo);

        let query = PageQuery {
            filter: Some("name ~".to_string()),
            ..Default::default()
        };
        let result = service.list_skills(&query).await;

        assert!(matches!(result, Err(SkillError::MalformedFilter(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_skill_is_not_found() {
        let mut mock_repo = MockSkillRepository::new();
        mock_repo.expect_delete().returning(|_| Ok(false));

        let service = SkillService::new(mock_repo);
        let result = service.delete_skill(3).await;

        assert!(matches!(result, Err(SkillError::NotFound(3))));
    }
}
