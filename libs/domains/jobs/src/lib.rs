//! Jobs Domain
//!
//! Job postings tie a company to a set of required skills. Skill references
//! resolve on write (unknown ids are dropped) so responses can embed skill
//! names without extra round trips. Active jobs feed the subscriber digest
//! in the notification component.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mysql;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{JobError, JobResult};
pub use models::{CompanyRef, CreateJob, Job, JobLevel, SkillRef, UpdateJob};
pub use mysql::MysqlJobRepository;
pub use repository::{InMemoryJobRepository, JobRepository};
pub use service::JobService;
