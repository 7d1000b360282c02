//! Resumes Domain
//!
//! A resume ties a user to a job posting and walks through a review status
//! lifecycle. Status changes fan out to the candidate through the
//! [`service::ResumeNotifier`] hook, wired to the email component in the
//! API binary. HR users attached to a company only see resumes for that
//! company's jobs.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mysql;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{ResumeError, ResumeResult};
pub use models::{CreateResume, JobRef, OwnerRef, Resume, ResumeStatus, UpdateResume};
pub use mysql::MysqlResumeRepository;
pub use repository::{InMemoryResumeRepository, JobCatalogEntry, ResumeRepository};
pub use service::{CompanyScopeResolver, ResumeNotifier, ResumeService};
