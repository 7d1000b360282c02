//! Subscribers Domain
//!
//! A subscriber is an email recipient following a set of skills. The digest
//! sender in the API binary pulls every subscriber with at least one followed
//! skill and mails matching active job postings.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mysql;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{SubscriberError, SubscriberResult};
pub use models::{CreateSubscriber, SkillRef, Subscriber, UpdateSubscriber};
pub use mysql::MysqlSubscriberRepository;
pub use repository::{InMemorySubscriberRepository, SubscriberRepository};
pub use service::SubscriberService;
