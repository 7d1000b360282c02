use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Review state of a submitted resume
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
pub enum ResumeStatus {
    Pending,
    Reviewing,
    Approved,
    Rejected,
}

/// Candidate who submitted the resume, embedded in responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OwnerRef {
    pub id: i64,
    pub name: String,
}

/// Job the resume applies to, embedded in responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct JobRef {
    pub id: i64,
    pub name: String,
}

/// Resume entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Resume {
    pub id: i64,
    /// Contact address for status notifications
    pub email: String,
    /// Link to the resume document
    pub url: String,
    pub status: ResumeStatus,
    pub user: OwnerRef,
    pub job: JobRef,
    /// Name of the company behind the job, for HR listings
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// DTO for submitting a resume
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateResume {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 512))]
    pub url: String,
    /// Submitting user; must exist
    pub user_id: i64,
    /// Job applied to; must exist
    pub job_id: i64,
}

/// DTO for updating a resume; only the review status can change
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateResume {
    pub status: ResumeStatus,
}
