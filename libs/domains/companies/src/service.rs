use axum_helpers::pagination::{Page, PageQuery};
use std::sync::Arc;
use validator::Validate;

use crate::error::{CompanyError, CompanyResult};
use crate::models::{Company, CreateCompany, UpdateCompany};
use crate::repository::CompanyRepository;

/// Service layer for Company business logic
#[derive(Clone)]
pub struct CompanyService<R: CompanyRepository> {
    repository: Arc<R>,
}

impl<R: CompanyRepository> CompanyService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new company
    pub async fn create_company(
        &self,
        input: CreateCompany,
        actor: Option<String>,
    ) -> CompanyResult<Company> {
        input
            .validate()
            .map_err(|e| CompanyError::Validation(e.to_string()))?;

        self.repository.create(input, actor).await
    }

    /// Get a company by ID
    pub async fn get_company(&self, id: i64) -> CompanyResult<Company> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CompanyError::NotFound(id))
    }

    /// List companies with pagination and an optional filter expression
    pub async fn list_companies(&self, query: &PageQuery) -> CompanyResult<Page<Company>> {
        let filter = query.filter.as_deref().map(filter_engine::parse).transpose()?;
        self.repository.find_page(filter, query.to_request()).await
    }

    /// Update a company
    pub async fn update_company(
        &self,
        id: i64,
        input: UpdateCompany,
        actor: Option<String>,
    ) -> CompanyResult<Company> {
        input
            .validate()
            .map_err(|e| CompanyError::Validation(e.to_string()))?;

        self.repository.update(id, input, actor).await
    }

    /// Delete a company (and, through the schema, its users)
    pub async fn delete_company(&self, id: i64) -> CompanyResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(CompanyError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCompanyRepository;

    #[tokio::test]
    async fn test_get_missing_company_is_not_found() {
        let mut mock_repo = MockCompanyRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(mockall::predicate::eq(5))
            .returning(|_| Ok(None));

        let service = CompanyService::new(mock_repo);
        let result = service.get_company(5).await;

        assert!(matches!(result, Err(CompanyError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let service = CompanyService::new(MockCompanyRepository::new());

        let result = service
            .create_company(
                CreateCompany {
                    name: String::new(),
                    description: None,
                    address: None,
                    logo: None,
                },
                None,
            )
            .await;

        assert!(matches!(result, Err(CompanyError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_rejects_malformed_filter() {
        let service = CompanyService::new(MockCompanyRepository::new());

        let query = PageQuery {
            filter: Some("(name : 'x'".to_string()),
            ..Default::default()
        };
        let result = service.list_companies(&query).await;

        assert!(matches!(result, Err(CompanyError::MalformedFilter(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_company_is_not_found() {
        let mut mock_repo = MockCompanyRepository::new();
        mock_repo.expect_delete().returning(|_| Ok(false));

        let service = CompanyService::new(mock_repo);
        let result = service.delete_company(9).await;

        assert!(matches!(result, Err(CompanyError::NotFound(9))));
    }
}
