use async_trait::async_trait;
use axum_helpers::pagination::{Page, PageRequest};
use filter_engine::FilterNode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CompanyError, CompanyResult};
use crate::models::{Company, CreateCompany, UpdateCompany};

/// Repository trait for Company persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Create a new company
    async fn create(&self, input: CreateCompany, actor: Option<String>) -> CompanyResult<Company>;

    /// Get a company by ID
    async fn get_by_id(&self, id: i64) -> CompanyResult<Option<Company>>;

    /// List a page of companies matching an optional filter
    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> CompanyResult<Page<Company>>;

    /// Update an existing company
    async fn update(
        &self,
        id: i64,
        input: UpdateCompany,
        actor: Option<String>,
    ) -> CompanyResult<Company>;

    /// Delete a company by ID (the schema cascades the delete to its users)
    async fn delete(&self, id: i64) -> CompanyResult<bool>;
}

/// In-memory implementation of CompanyRepository (for development/testing)
#[derive(Debug, Default)]
pub struct InMemoryCompanyRepository {
    companies: Arc<RwLock<HashMap<i64, Company>>>,
    next_id: AtomicI64,
}

impl InMemoryCompanyRepository {
    pub fn new() -> Self {
        Self {
            companies: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

fn filter_matches(node: &FilterNode, company: &Company) -> CompanyResult<bool> {
    let value = serde_json::to_value(company)
        .map_err(|e| CompanyError::Internal(format!("Serialization error: {}", e)))?;
    Ok(filter_engine::matches(node, &value)?)
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn create(&self, input: CreateCompany, actor: Option<String>) -> CompanyResult<Company> {
        let mut companies = self.companies.write().await;

        let company = Company {
            id: self.allocate_id(),
            name: input.name,
            description: input.description,
            address: input.address,
            logo: input.logo,
            created_at: chrono::Utc::now(),
            updated_at: None,
            created_by: actor,
            updated_by: None,
        };
        companies.insert(company.id, company.clone());

        tracing::info!(company_id = company.id, "Created company");
        Ok(company)
    }

    async fn get_by_id(&self, id: i64) -> CompanyResult<Option<Company>> {
        let companies = self.companies.read().await;
        Ok(companies.get(&id).cloned())
    }

    async fn find_page(
        &self,
        filter: Option<FilterNode>,
        page: PageRequest,
    ) -> CompanyResult<Page<Company>> {
        let companies = self.companies.read().await;

        let mut matching = Vec::new();
        for company in companies.values() {
            let keep = match &filter {
                Some(node) => filter_matches(node, company)?,
                None => true,
            };
            if keep {
                matching.push(company.clone());
            }
        }

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let window: Vec<Company> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(page, total, window))
    }

    async fn update(
        &self,
        id: i64,
        input: UpdateCompany,
        actor: Option<String>,
    ) -> CompanyResult<Company> {
        let mut companies = self.companies.write().await;

        let company = companies.get_mut(&id).ok_or(CompanyError::NotFound(id))?;
        company.apply_update(input, actor);
        let updated = company.clone();

        tracing::info!(company_id = id, "Updated company");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> CompanyResult<bool> {
        let mut companies = self.companies.write().await;

        if companies.remove(&id).is_some() {
            tracing::info!(company_id = id, "Deleted company");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> CreateCompany {
        CreateCompany {
            name: "Acme".to_string(),
            description: Some("Rocket supplies".to_string()),
            address: Some("Hanoi".to_string()),
            logo: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_company() {
        let repo = InMemoryCompanyRepository::new();

        let company = repo.create(acme(), Some("admin@gmail.com".into())).await.unwrap();
        assert_eq!(company.name, "Acme");
        assert_eq!(company.created_by.as_deref(), Some("admin@gmail.com"));

        let fetched = repo.get_by_id(company.id).await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn test_update_sets_audit_columns() {
        let repo = InMemoryCompanyRepository::new();
        let company = repo.create(acme(), None).await.unwrap();

        let updated = repo
            .update(
                company.id,
                UpdateCompany {
                    name: Some("Acme Corp".to_string()),
                    ..Default::default()
                },
                Some("hr@acme.com".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Acme Corp");
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.updated_by.as_deref(), Some("hr@acme.com"));
    }

    #[tokio::test]
    async fn test_find_page_filters_by_address() {
        let repo = InMemoryCompanyRepository::new();
        repo.create(acme(), None).await.unwrap();
        repo.create(
            CreateCompany {
                name: "Globex".to_string(),
                description: None,
                address: Some("Saigon".to_string()),
                logo: None,
            },
            None,
        )
        .await
        .unwrap();

        let node = filter_engine::parse("address : 'Hanoi'").unwrap();
        let page = repo
            .find_page(Some(node), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.result[0].name, "Acme");
    }

    #[tokio::test]
    async fn test_delete_missing_company_returns_false() {
        let repo = InMemoryCompanyRepository::new();
        assert!(!repo.delete(404).await.unwrap());
    }
}
