//! Companies Domain
//!
//! Companies own jobs and employ users. Deleting a company also removes its
//! users (enforced by the schema's cascading foreign key).
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_companies::{
//!     handlers,
//!     repository::InMemoryCompanyRepository,
//!     service::CompanyService,
//! };
//!
//! let repository = InMemoryCompanyRepository::new();
//! let service = CompanyService::new(repository);
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mysql;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{CompanyError, CompanyResult};
pub use models::{Company, CreateCompany, UpdateCompany};
pub use mysql::MysqlCompanyRepository;
pub use repository::{CompanyRepository, InMemoryCompanyRepository};
pub use service::CompanyService;
