//! Skills Domain
//!
//! Skills are the vocabulary shared by jobs and subscribers: a job requires
//! a set of skills, a subscriber registers interest in a set of skills.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mysql;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{SkillError, SkillResult};
pub use models::{CreateSkill, Skill, UpdateSkill};
pub use mysql::MysqlSkillRepository;
pub use repository::{InMemorySkillRepository, SkillRepository};
pub use service::SkillService;
