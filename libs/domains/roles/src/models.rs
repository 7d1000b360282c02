use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Permission entity - one HTTP operation a role may perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Permission {
    pub id: i64,
    /// Human-readable label, e.g. "Create a company"
    pub name: String,
    /// Route template, e.g. `/api/v1/companies/{id}`
    pub api_path: String,
    /// HTTP method, e.g. `GET`
    pub method: String,
    /// Resource group, e.g. `COMPANIES`
    pub module: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// DTO for creating a new permission
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePermission {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub api_path: String,
    #[validate(length(min = 1, max = 10))]
    pub method: String,
    #[validate(length(min = 1, max = 100))]
    pub module: String,
}

/// DTO for updating an existing permission
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePermission {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub api_path: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub method: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub module: Option<String>,
}

impl Permission {
    /// Apply updates from UpdatePermission DTO
    pub fn apply_update(&mut self, update: UpdatePermission, actor: Option<String>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(api_path) = update.api_path {
            self.api_path = api_path;
        }
        if let Some(method) = update.method {
            self.method = method;
        }
        if let Some(module) = update.module {
            self.module = module;
        }
        self.updated_at = Some(Utc::now());
        self.updated_by = actor;
    }
}

/// Role entity - a named bundle of permissions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: i64,
    /// Role name (unique), e.g. `SUPER_ADMIN`, `HR`
    pub name: String,
    pub description: Option<String>,
    /// Inactive roles grant nothing
    pub active: bool,
    /// Permissions attached to this role
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// DTO for creating a new role
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRole {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Permission ids to attach; unknown ids are dropped
    #[serde(default)]
    pub permission_ids: Vec<i64>,
}

fn default_active() -> bool {
    true
}

/// DTO for updating an existing role
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRole {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    /// When present, replaces the attached permission set
    pub permission_ids: Option<Vec<i64>>,
}

impl Role {
    /// Apply the scalar updates from UpdateRole; the permission set is
    /// resolved by the repository.
    pub fn apply_update(&mut self, update: &UpdateRole, actor: Option<String>) {
        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(ref description) = update.description {
            self.description = Some(description.clone());
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        self.updated_at = Some(Utc::now());
        self.updated_by = actor;
    }
}
