use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use domain_roles::Role;
use filter_engine::FilterNode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{AuthUser, CompanyRef, CreateUser, RoleRef, UpdateUser, User};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user from an already-hashed password. Unknown company
    /// and role references are stored as null.
    async fn create(
        &self,
        input: CreateUser,
        password_hash: String,
        actor: Option<String>,
    ) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// List a page of users matching an optional filter
    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> UserResult<Page<User>>;

    /// Update an existing user. Email and password are untouched.
    async fn update(&self, id: i64, input: UpdateUser, actor: Option<String>) -> UserResult<User>;

    /// Delete a user by ID
    async fn delete(&self, id: i64) -> UserResult<bool>;

    /// Load the credential view for login
    async fn find_auth_by_email(&self, email: &str) -> UserResult<Option<AuthUser>>;

    /// Load the credential view when the stored refresh token matches
    async fn find_by_refresh_token_and_email(
        &self,
        token: &str,
        email: &str,
    ) -> UserResult<Option<AuthUser>>;

    /// Persist (or clear) the refresh token for a user
    async fn update_refresh_token(&self, user_id: i64, token: Option<String>) -> UserResult<()>;
}

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: String,
    refresh_token: Option<String>,
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Carries company and role catalogs so references can be resolved without
/// a database.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<i64, UserRecord>>>,
    companies: Arc<RwLock<HashMap<i64, CompanyRef>>>,
    roles: Arc<RwLock<HashMap<i64, Role>>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::with_catalogs(Vec::new(), Vec::new())
    }

    /// Seed the company and role catalogs used to resolve references.
    pub fn with_catalogs(companies: Vec<CompanyRef>, roles: Vec<Role>) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            companies: Arc::new(RwLock::new(
                companies.into_iter().map(|c| (c.id, c)).collect(),
            )),
            roles: Arc::new(RwLock::new(roles.into_iter().map(|r| (r.id, r)).collect())),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn auth_user(&self, record: &UserRecord) -> AuthUser {
        let roles = self.roles.read().await;
        AuthUser {
            id: record.user.id,
            name: record.user.name.clone(),
            email: record.user.email.clone(),
            password_hash: record.password_hash.clone(),
            refresh_token: record.refresh_token.clone(),
            role: record
                .user
                .role
                .as_ref()
                .and_then(|r| roles.get(&r.id).cloned()),
        }
    }
}

/// Evaluate a filter node against a serializable record.
fn filter_matches<T: serde::Serialize>(node: &FilterNode, record: &T) -> UserResult<bool> {
    let value = serde_json::to_value(record)
        .map_err(|e| UserError::Internal(format!("Serialization error: {}", e)))?;
    Ok(filter_engine::matches(node, &value)?)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(
        &self,
        input: CreateUser,
        password_hash: String,
        actor: Option<String>,
    ) -> UserResult<User> {
        let company = match input.company_id {
            Some(id) => self.companies.read().await.get(&id).cloned(),
            None => None,
        };
        let role = match input.role_id {
            Some(id) => self.roles.read().await.get(&id).map(|r| RoleRef {
                id: r.id,
                name: r.name.clone(),
            }),
            None => None,
        };

        let mut users = self.users.write().await;

        let email_exists = users
            .values()
            .any(|r| r.user.email.eq_ignore_ascii_case(&input.email));
        if email_exists {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let user = User {
            id: self.allocate_id(),
            name: input.name,
            email: input.email,
            age: input.age,
            gender: input.gender,
            address: input.address,
            company,
            role,
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: actor,
            updated_by: None,
        };
        users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password_hash,
                refresh_token: None,
            },
        );

        tracing::info!(user_id = user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|r| r.user.clone()))
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> UserResult<Page<User>> {
        let users = self.users.read().await;

        let mut matching = Vec::new();
        for record in users.values() {
            let keep = match &filter {
                Some(node) => filter_matches(node, &record.user)?,
                None => true,
            };
            if keep {
                matching.push(record.user.clone());
            }
        }

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let window: Vec<User> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(page, total, window))
    }

    async fn update(&self, id: i64, input: UpdateUser, actor: Option<String>) -> UserResult<User> {
        let company = match input.company_id {
            Some(id) => self.companies.read().await.get(&id).cloned(),
            None => None,
        };
        let role = match input.role_id {
            Some(id) => self.roles.read().await.get(&id).map(|r| RoleRef {
                id: r.id,
                name: r.name.clone(),
            }),
            None => None,
        };

        let mut users = self.users.write().await;
        let record = users.get_mut(&id).ok_or(UserError::NotFound(id))?;

        record.user.apply_update(&input, actor);
        if input.company_id.is_some() {
            record.user.company = company;
        }
        if input.role_id.is_some() {
            record.user.role = role;
        }
        let updated = record.user.clone();

        tracing::info!(user_id = id, "Updated user");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn find_auth_by_email(&self, email: &str) -> UserResult<Option<AuthUser>> {
        let record = {
            let users = self.users.read().await;
            users
                .values()
                .find(|r| r.user.email.eq_ignore_ascii_case(email))
                .cloned()
        };

        match record {
            Some(record) => Ok(Some(self.auth_user(&record).await)),
            None => Ok(None),
        }
    }

    async fn find_by_refresh_token_and_email(
        &self,
        token: &str,
        email: &str,
    ) -> UserResult<Option<AuthUser>> {
        let record = {
            let users = self.users.read().await;
            users
                .values()
                .find(|r| {
                    r.user.email.eq_ignore_ascii_case(email)
                        && r.refresh_token.as_deref() == Some(token)
                })
                .cloned()
        };

        match record {
            Some(record) => Ok(Some(self.auth_user(&record).await)),
            None => Ok(None),
        }
    }

    async fn update_refresh_token(&self, user_id: i64, token: Option<String>) -> UserResult<()> {
        let mut users = self.users.write().await;
        let record = users.get_mut(&user_id).ok_or(UserError::NotFound(user_id))?;
        record.refresh_token = token;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> CreateUser {
        CreateUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret123".to_string(),
            age: Some(30),
            gender: Some(crate::models::Gender::Female),
            address: None,
            company_id: None,
            role_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = InMemoryUserRepository::new();

        let user = repo.create(ada(), "hash".to_string(), None).await.unwrap();
        assert_eq!(user.email, "ada@example.com");

        let fetched = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Ada");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(ada(), "hash".to_string(), None).await.unwrap();

        let mut other = ada();
        other.name = "Other".to_string();
        other.email = "ADA@example.com".to_string();

        let result = repo.create(other, "hash".to_string(), None).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_unknown_company_reference_is_nulled() {
        let repo = InMemoryUserRepository::new();

        let mut input = ada();
        input.company_id = Some(42);

        let user = repo.create(input, "hash".to_string(), None).await.unwrap();
        assert!(user.company.is_none());
    }

    #[tokio::test]
    async fn test_known_company_reference_is_embedded() {
        let repo = InMemoryUserRepository::with_catalogs(
            vec![CompanyRef {
                id: 1,
                name: "Acme".to_string(),
            }],
            Vec::new(),
        );

        let mut input = ada();
        input.company_id = Some(1);

        let user = repo.create(input, "hash".to_string(), None).await.unwrap();
        assert_eq!(user.company.unwrap().name, "Acme");
    }

    #[tokio::test]
    async fn test_refresh_token_round_trip() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(ada(), "hash".to_string(), None).await.unwrap();

        repo.update_refresh_token(user.id, Some("token-1".to_string()))
            .await
            .unwrap();

        let found = repo
            .find_by_refresh_token_and_email("token-1", "ada@example.com")
            .await
            .unwrap();
        assert!(found.is_some());

        repo.update_refresh_token(user.id, None).await.unwrap();
        let found = repo
            .find_by_refresh_token_and_email("token-1", "ada@example.com")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_auth_by_email_carries_hash() {
        let repo = InMemoryUserRepository::new();
        repo.create(ada(), "argon2hash".to_string(), None)
            .await
            .unwrap();

        let auth = repo
            .find_auth_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(auth.password_hash, "argon2hash");
    }
}
