use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{CompanyRef, CreateUser, Gender, RoleRef, User};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub refresh_token: Option<String>,
    pub company_id: Option<i64>,
    pub role_id: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert a user row plus its resolved references into the domain model.
/// The password hash and refresh token stay behind.
pub fn user_from_model(
    model: Model,
    company: Option<CompanyRef>,
    role: Option<RoleRef>,
) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        age: model.age,
        gender: model.gender.as_deref().and_then(|g| Gender::from_str(g).ok()),
        address: model.address,
        company,
        role,
        created_at: model.created_at,
        updated_at: model.updated_at,
        created_by: model.created_by,
        updated_by: model.updated_by,
    }
}

/// Build an ActiveModel for insertion. `company_id` and `role_id` must
/// already be validated (unknown references nulled out).
pub fn new_active_model(
    input: &CreateUser,
    password_hash: String,
    company_id: Option<i64>,
    role_id: Option<i64>,
    actor: Option<String>,
) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        name: Set(input.name.clone()),
        email: Set(input.email.clone()),
        password: Set(password_hash),
        age: Set(input.age),
        gender: Set(input.gender.map(|g| g.to_string())),
        address: Set(input.address.clone()),
        refresh_token: Set(None),
        company_id: Set(company_id),
        role_id: Set(role_id),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
        created_by: Set(actor),
        updated_by: Set(None),
    }
}
