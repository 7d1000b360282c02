//! Users Domain
//!
//! Users carry the credentials behind the auth endpoints as well as the
//! usual CRUD surface. The password is hashed with argon2 before it touches
//! storage, and neither the hash nor the refresh token ever serializes into
//! a response. Company and role references embed as `{ id, name }` pairs.

pub mod auth;
pub mod auth_handlers;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mysql;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth::AuthService;
pub use error::{AuthError, AuthResult, UserError, UserResult};
pub use models::{
    AccountUser, AuthUser, CompanyRef, CreateUser, Gender, LoginRequest, LoginResponse,
    RegisterRequest, RoleRef, UpdateUser, User,
};
pub use mysql::MysqlUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
