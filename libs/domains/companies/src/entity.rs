use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::models::{Company, CreateCompany};

/// Sea-ORM entity for the companies table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub address: Option<String>,
    pub logo: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Company {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            address: model.address,
            logo: model.logo,
            created_at: model.created_at,
            updated_at: model.updated_at,
            created_by: model.created_by,
            updated_by: model.updated_by,
        }
    }
}

/// Build an ActiveModel for insertion from a create DTO.
pub fn new_active_model(input: CreateCompany, actor: Option<String>) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        name: Set(input.name),
        description: Set(input.description),
        address: Set(input.address),
        logo: Set(input.logo),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
        created_by: Set(actor),
        updated_by: Set(None),
    }
}
