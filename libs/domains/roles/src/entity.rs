//! Sea-ORM entities for roles, permissions and their join table.

pub mod role {
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::{NotSet, Set};
    use serde::{Deserialize, Serialize};

    use crate::models::CreateRole;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "roles")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub name: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub description: Option<String>,
        pub active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: Option<DateTimeUtc>,
        pub created_by: Option<String>,
        pub updated_by: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    /// Build an ActiveModel for insertion from a create DTO.
    pub fn new_active_model(input: &CreateRole, actor: Option<String>) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            active: Set(input.active),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
            created_by: Set(actor),
            updated_by: Set(None),
        }
    }
}

pub mod permission {
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::{NotSet, Set};
    use serde::{Deserialize, Serialize};

    use crate::models::{CreatePermission, Permission};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "permissions")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub api_path: String,
        pub method: String,
        pub module: String,
        pub created_at: DateTimeUtc,
        pub updated_at: Option<DateTimeUtc>,
        pub created_by: Option<String>,
        pub updated_by: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for Permission {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
                api_path: model.api_path,
                method: model.method,
                module: model.module,
                created_at: model.created_at,
                updated_at: model.updated_at,
                created_by: model.created_by,
                updated_by: model.updated_by,
            }
        }
    }

    /// Build an ActiveModel for insertion from a create DTO.
    pub fn new_active_model(input: CreatePermission, actor: Option<String>) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            name: Set(input.name),
            api_path: Set(input.api_path),
            method: Set(input.method),
            module: Set(input.module),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
            created_by: Set(actor),
            updated_by: Set(None),
        }
    }
}

pub mod permission_role {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "permission_role")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub role_id: i64,
        #[sea_orm(primary_key, auto_increment = false)]
        pub permission_id: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::role::Entity",
            from = "Column::RoleId",
            to = "super::role::Column::Id"
        )]
        Role,
        #[sea_orm(
            belongs_to = "super::permission::Entity",
            from = "Column::PermissionId",
            to = "super::permission::Column::Id"
        )]
        Permission,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Convert a role row plus its resolved permissions into the domain model.
pub fn role_with_permissions(
    model: role::Model,
    permissions: Vec<crate::models::Permission>,
) -> crate::models::Role {
    crate::models::Role {
        id: model.id,
        name: model.name,
        description: model.description,
        active: model.active,
        permissions,
        created_at: model.created_at,
        updated_at: model.updated_at,
        created_by: model.created_by,
        updated_by: model.updated_by,
    }
}

// Re-exported for the API binary's permission guard queries.
pub use permission::Entity as PermissionEntity;
pub use permission_role::Entity as PermissionRoleEntity;
pub use role::Entity as RoleEntity;
