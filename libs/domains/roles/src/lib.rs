//! Roles and Permissions Domain
//!
//! A role is a named bundle of fine-grained permissions. A permission is an
//! (api_path, method, module) triple naming one HTTP operation. The request
//! guard in the API binary matches the caller's role permissions against the
//! incoming route; the `SUPER_ADMIN` role bypasses the check.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mysql;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{PermissionError, PermissionResult, RoleError, RoleResult};
pub use models::{
    CreatePermission, CreateRole, Permission, Role, UpdatePermission, UpdateRole,
};
pub use mysql::{MysqlPermissionRepository, MysqlRoleRepository};
pub use repository::{
    InMemoryPermissionRepository, InMemoryRoleRepository, PermissionRepository, RoleRepository,
};
pub use service::{PermissionService, RoleService};

/// Role name that bypasses permission checks.
pub const SUPER_ADMIN_ROLE: &str = "SUPER_ADMIN";
