use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Skill entity - a named competence required by jobs and followed by subscribers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Skill {
    /// Unique identifier
    pub id: i64,
    /// Skill name (unique)
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
    /// Email of the user who created the row
    pub created_by: Option<String>,
    /// Email of the user who last updated the row
    pub updated_by: Option<String>,
}

/// DTO for creating a new skill
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSkill {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// DTO for updating an existing skill
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSkill {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

impl Skill {
    /// Apply updates from UpdateSkill DTO
    pub fn apply_update(&mut self, update: UpdateSkill, actor: Option<String>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        self.updated_at = Some(Utc::now());
        self.updated_by = actor;
    }
}
