//! Company scoping for resume listings.
//!
//! HR users attached to a company only see resumes for that company's
//! jobs. Users without a company, or with the SUPER_ADMIN role, see
//! everything.

use async_trait::async_trait;
use domain_resumes::CompanyScopeResolver;
use domain_roles::entity::role;
use domain_roles::SUPER_ADMIN_ROLE;
use sea_orm::{DatabaseConnection, EntityTrait};

pub struct UserCompanyScope {
    db: DatabaseConnection,
}

impl UserCompanyScope {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CompanyScopeResolver for UserCompanyScope {
    async fn company_scope(&self, user_id: i64) -> Option<i64> {
        let user = domain_users::entity::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .ok()
            .flatten()?;
        let company_id = user.company_id?;

        if let Some(role_id) = user.role_id {
            let user_role = role::Entity::find_by_id(role_id)
                .one(&self.db)
                .await
                .ok()
                .flatten();
            if user_role.is_some_and(|r| r.name == SUPER_ADMIN_ROLE) {
                return None;
            }
        }

        Some(company_id)
    }
}
