//! Sea-ORM entities for jobs and the job_skill join table.

use std::str::FromStr;

use crate::models::{CompanyRef, Job, JobLevel, SkillRef};

pub mod job {
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::{NotSet, Set};
    use serde::{Deserialize, Serialize};

    use crate::models::CreateJob;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "jobs")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub location: Option<String>,
        #[sea_orm(column_type = "Double", nullable)]
        pub salary: Option<f64>,
        pub quantity: Option<i32>,
        pub level: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub description: Option<String>,
        pub start_date: Option<DateTimeUtc>,
        pub end_date: Option<DateTimeUtc>,
        pub active: bool,
        pub company_id: Option<i64>,
        pub created_at: DateTimeUtc,
        pub updated_at: Option<DateTimeUtc>,
        pub created_by: Option<String>,
        pub updated_by: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    /// Build an ActiveModel for insertion. `company_id` must already be
    /// validated (unknown references nulled out).
    pub fn new_active_model(
        input: &CreateJob,
        company_id: Option<i64>,
        actor: Option<String>,
    ) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            name: Set(input.name.clone()),
            location: Set(input.location.clone()),
            salary: Set(input.salary),
            quantity: Set(input.quantity),
            level: Set(input.level.map(|l| l.to_string())),
            description: Set(input.description.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            active: Set(input.active),
            company_id: Set(company_id),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
            created_by: Set(actor),
            updated_by: Set(None),
        }
    }
}

pub mod job_skill {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "job_skill")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub job_id: i64,
        #[sea_orm(primary_key, auto_increment = false)]
        pub skill_id: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::job::Entity",
            from = "Column::JobId",
            to = "super::job::Column::Id"
        )]
        Job,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Convert a job row plus its resolved references into the domain model.
pub fn job_from_model(
    model: job::Model,
    company: Option<CompanyRef>,
    skills: Vec<SkillRef>,
) -> Job {
    Job {
        id: model.id,
        name: model.name,
        location: model.location,
        salary: model.salary,
        quantity: model.quantity,
        level: model.level.as_deref().and_then(|l| JobLevel::from_str(l).ok()),
        description: model.description,
        start_date: model.start_date,
        end_date: model.end_date,
        active: model.active,
        company,
        skills,
        created_at: model.created_at,
        updated_at: model.updated_at,
        created_by: model.created_by,
        updated_by: model.updated_by,
    }
}

pub use job::Entity as JobEntity;
pub use job_skill::Entity as JobSkillEntity;
