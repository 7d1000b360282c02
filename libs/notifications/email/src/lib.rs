//! Email Notifications
//!
//! Best-effort transactional email: application status updates for
//! candidates and job digests for subscribers. Providers are pluggable
//! behind [`EmailProvider`]; production uses SMTP via lettre, tests use
//! the capturing mock.

pub mod models;
pub mod provider;
pub mod service;
pub mod templates;

pub use models::Email;
pub use provider::{EmailProvider, MockEmailProvider, SendResult, SmtpConfig, SmtpProvider};
pub use service::NotificationService;
pub use templates::{RenderedTemplate, TemplateEngine};
