use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Seniority level of a job posting
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobLevel {
    Intern,
    Fresher,
    Junior,
    Middle,
    Senior,
}

/// Company offering the job, embedded in job responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompanyRef {
    pub id: i64,
    pub name: String,
}

/// Skill required by the job, embedded in job responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SkillRef {
    pub id: i64,
    pub name: String,
}

/// Job entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Job {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub salary: Option<f64>,
    pub quantity: Option<i32>,
    pub level: Option<JobLevel>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Inactive jobs are excluded from subscriber digests
    pub active: bool,
    pub company: Option<CompanyRef>,
    /// Skills required by the job
    pub skills: Vec<SkillRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// DTO for creating a new job
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateJob {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub location: Option<String>,
    #[validate(range(min = 0.0))]
    pub salary: Option<f64>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub level: Option<JobLevel>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub company_id: Option<i64>,
    /// Skill ids to attach; unknown ids are dropped
    #[serde(default)]
    pub skill_ids: Vec<i64>,
}

fn default_active() -> bool {
    true
}

/// DTO for updating an existing job
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateJob {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 0.0))]
    pub salary: Option<f64>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub level: Option<JobLevel>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub company_id: Option<i64>,
    /// When present, replaces the attached skill set
    pub skill_ids: Option<Vec<i64>>,
}

impl Job {
    /// Apply the scalar updates from UpdateJob; skill and company refs are
    /// resolved by the repository.
    pub fn apply_update(&mut self, update: &UpdateJob, actor: Option<String>) {
        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(ref location) = update.location {
            self.location = Some(location.clone());
        }
        if let Some(salary) = update.salary {
            self.salary = Some(salary);
        }
        if let Some(quantity) = update.quantity {
            self.quantity = Some(quantity);
        }
        if let Some(level) = update.level {
            self.level = Some(level);
        }
        if let Some(ref description) = update.description {
            self.description = Some(description.clone());
        }
        if let Some(start_date) = update.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(end_date) = update.end_date {
            self.end_date = Some(end_date);
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        self.updated_at = Some(Utc::now());
        self.updated_by = actor;
    }
}
