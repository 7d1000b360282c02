use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Company entity - an employer that publishes jobs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Company {
    /// Unique identifier
    pub id: i64,
    /// Company name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Logo URL
    pub logo: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// DTO for creating a new company
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCompany {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub logo: Option<String>,
}

/// DTO for updating an existing company
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCompany {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub logo: Option<String>,
}

impl Company {
    /// Apply updates from UpdateCompany DTO
    pub fn apply_update(&mut self, update: UpdateCompany, actor: Option<String>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        if let Some(logo) = update.logo {
            self.logo = Some(logo);
        }
        self.updated_at = Some(Utc::now());
        self.updated_by = actor;
    }
}
