use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{CreateResume, JobRef, OwnerRef, Resume, ResumeStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resumes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub status: String,
    pub user_id: i64,
    pub job_id: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert a resume row plus its resolved references into the domain model.
/// A status string that fails to parse falls back to Pending.
pub fn resume_from_model(
    model: Model,
    user: OwnerRef,
    job: JobRef,
    company_name: Option<String>,
) -> Resume {
    Resume {
        id: model.id,
        email: model.email,
        url: model.url,
        status: ResumeStatus::from_str(&model.status).unwrap_or(ResumeStatus::Pending),
        user,
        job,
        company_name,
        created_at: model.created_at,
        updated_at: model.updated_at,
        created_by: model.created_by,
        updated_by: model.updated_by,
    }
}

/// Build an ActiveModel for insertion. References must already be validated.
pub fn new_active_model(input: &CreateResume, actor: Option<String>) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        email: Set(input.email.clone()),
        url: Set(input.url.clone()),
        status: Set(ResumeStatus::Pending.to_string()),
        user_id: Set(input.user_id),
        job_id: Set(input.job_id),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
        created_by: Set(actor),
        updated_by: Set(None),
    }
}
