//! Sea-ORM entities for subscribers and the skill_subscriber join table.

use crate::models::{SkillRef, Subscriber};

pub mod subscriber {
    use sea_orm::entity::prelude::*;
    use sea_orm::ActiveValue::{NotSet, Set};
    use serde::{Deserialize, Serialize};

    use crate::models::CreateSubscriber;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "subscribers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub email: String,
        pub name: String,
        pub created_at: DateTimeUtc,
        pub updated_at: Option<DateTimeUtc>,
        pub created_by: Option<String>,
        pub updated_by: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    /// Build an ActiveModel for insertion from a create DTO.
    pub fn new_active_model(input: &CreateSubscriber, actor: Option<String>) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            email: Set(input.email.clone()),
            name: Set(input.name.clone()),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
            created_by: Set(actor),
            updated_by: Set(None),
        }
    }
}

pub mod skill_subscriber {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "skill_subscriber")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub subscriber_id: i64,
        #[sea_orm(primary_key, auto_increment = false)]
        pub skill_id: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::subscriber::Entity",
            from = "Column::SubscriberId",
            to = "super::subscriber::Column::Id"
        )]
        Subscriber,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Convert a subscriber row plus its resolved skills into the domain model.
pub fn subscriber_from_model(model: subscriber::Model, skills: Vec<SkillRef>) -> Subscriber {
    Subscriber {
        id: model.id,
        email: model.email,
        name: model.name,
        skills,
        created_at: model.created_at,
        updated_at: model.updated_at,
        created_by: model.created_by,
        updated_by: model.updated_by,
    }
}

pub use skill_subscriber::Entity as SkillSubscriberEntity;
pub use subscriber::Entity as SubscriberEntity;
