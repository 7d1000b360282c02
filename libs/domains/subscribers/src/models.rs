use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Embedded reference to a followed skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SkillRef {
    pub id: i64,
    pub name: String,
}

/// Subscriber entity - an email recipient following a set of skills
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Subscriber {
    /// Unique identifier
    pub id: i64,
    /// Email address (unique)
    pub email: String,
    /// Display name
    pub name: String,
    /// Skills this subscriber follows
    pub skills: Vec<SkillRef>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
    /// Email of the user who created the row
    pub created_by: Option<String>,
    /// Email of the user who last updated the row
    pub updated_by: Option<String>,
}

/// DTO for creating a new subscriber
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSubscriber {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Skill ids to follow; unknown ids are dropped
    #[serde(default)]
    pub skill_ids: Vec<i64>,
}

/// DTO for updating an existing subscriber. The email is immutable.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSubscriber {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// Replaces the followed skill set when present
    pub skill_ids: Option<Vec<i64>>,
}

impl Subscriber {
    /// Apply scalar updates; the skill set is resolved by the repository.
    pub fn apply_update(&mut self, update: &UpdateSubscriber, actor: Option<String>) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        self.updated_at = Some(Utc::now());
        self.updated_by = actor;
    }
}
