use axum_helpers::pagination::{Page, PageQuery};
use std::sync::Arc;
use validator::Validate;

use crate::auth::hash_password;
use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn from_arc(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a new user, hashing the password before it reaches storage
    pub async fn create_user(&self, input: CreateUser, actor: Option<String>) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let password_hash = hash_password(&input.password)
            .map_err(|e| UserError::Internal(format!("Password hashing failed: {}", e)))?;

        self.repository.create(input, password_hash, actor).await
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: i64) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// List users with pagination and an optional filter expression
    pub async fn list_users(&self, query: &PageQuery) -> UserResult<Page<User>> {
        let filter = query.filter.as_deref().map(filter_engine::parse).transpose()?;
        self.repository.find_page(filter, query.to_request()).await
    }

    /// Update a user; email and password are not changed here
    pub async fn update_user(
        &self,
        id: i64,
        input: UpdateUser,
        actor: Option<String>,
    ) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        self.repository.update(id, input, actor).await
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;

    fn ada() -> CreateUser {
        CreateUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret123".to_string(),
            age: None,
            gender: None,
            address: None,
            company_id: None,
            role_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_create()
            .withf(|input, hash, _| {
                input.email == "ada@example.com"
                    && hash != "secret123"
                    && hash.starts_with("$argon2")
            })
            .returning(|input, _, _| {
                Ok(User {
                    id: 1,
                    name: input.name,
                    email: input.email,
                    age: input.age,
                    gender: input.gender,
                    address: input.address,
                    company: None,
                    role: None,
                    created_at: chrono::Utc::now(),
                    updated_at: None,
                    created_by: None,
                    updated_by: None,
                })
            });

        let service = UserService::new(mock_repo);
        let user = service.create_user(ada(), None).await.unwrap();
        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let mock_repo = MockUserRepository::new();
        let service = UserService::new(mock_repo);

        let mut input = ada();
        input.email = "not-an-email".to_string();

        let result = service.create_user(input, None).await;
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_short_password() {
        let mock_repo = MockUserRepository::new();
        let service = UserService::new(mock_repo);

        let mut input = ada();
        input.password = "123".to_string();

        let result = service.create_user(input, None).await;
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(mockall::predicate::eq(7))
            .returning(|_| Ok(None));

        let service = UserService::new(mock_repo);
        let result = service.get_user(7).await;

        assert!(matches!(result, Err(UserError::NotFound(7))));
    }
}
