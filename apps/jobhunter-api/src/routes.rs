//! Assembles the /api surface from the domain routers.

use axum::{middleware, Router};
use axum_helpers::auth::{optional_jwt_auth_middleware, JwtAuth};
use domain_companies::{CompanyService, MysqlCompanyRepository};
use domain_jobs::{JobService, MysqlJobRepository};
use domain_resumes::{MysqlResumeRepository, ResumeService};
use domain_roles::{MysqlPermissionRepository, MysqlRoleRepository, PermissionService, RoleService};
use domain_skills::{MysqlSkillRepository, SkillService};
use domain_subscribers::{MysqlSubscriberRepository, SubscriberService};
use domain_users::{AuthService, MysqlUserRepository, UserService};
use notifications_email::NotificationService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::digest::{self, DigestState};
use crate::guard::{permission_guard, PermissionGuard};
use crate::scope::UserCompanyScope;

/// Build the versioned API router with authentication and the permission
/// guard applied. The returned router is nested under /api by the server
/// setup.
pub fn api_router(
    db: DatabaseConnection,
    jwt: JwtAuth,
    notifications: Option<Arc<NotificationService>>,
) -> Router {
    let auth = AuthService::new(MysqlUserRepository::new(db.clone()), jwt.clone());
    let users = UserService::new(MysqlUserRepository::new(db.clone()));
    let companies = CompanyService::new(MysqlCompanyRepository::new(db.clone()));
    let skills = SkillService::new(MysqlSkillRepository::new(db.clone()));
    let jobs = JobService::new(MysqlJobRepository::new(db.clone()));
    let roles = RoleService::new(MysqlRoleRepository::new(db.clone()));
    let permissions = PermissionService::new(MysqlPermissionRepository::new(db.clone()));
    let subscribers = SubscriberService::new(MysqlSubscriberRepository::new(db.clone()));

    let mut resumes = ResumeService::new(MysqlResumeRepository::new(db.clone()))
        .with_scope_resolver(Arc::new(UserCompanyScope::new(db.clone())));
    if let Some(notifications) = notifications.clone() {
        resumes = resumes.with_notifier(notifications);
    }

    let digest_state = DigestState {
        subscribers: subscribers.clone(),
        jobs: jobs.clone(),
        notifications,
    };

    let guard = PermissionGuard::new(db);

    Router::new()
        .nest("/v1/auth", domain_users::auth_handlers::auth_router(auth))
        .nest("/v1/companies", domain_companies::handlers::router(companies))
        .nest("/v1/users", domain_users::handlers::router(users))
        .nest("/v1/jobs", domain_jobs::handlers::router(jobs))
        .nest("/v1/skills", domain_skills::handlers::router(skills))
        .nest("/v1/resumes", domain_resumes::handlers::router(resumes))
        .nest("/v1/roles", domain_roles::handlers::roles_router(roles))
        .nest(
            "/v1/permissions",
            domain_roles::handlers::permissions_router(permissions),
        )
        .nest(
            "/v1/subscribers",
            domain_subscribers::handlers::router(subscribers),
        )
        .nest("/v1/email", digest::router(digest_state))
        .layer(middleware::from_fn_with_state(guard, permission_guard))
        .layer(middleware::from_fn_with_state(
            jwt,
            optional_jwt_auth_middleware,
        ))
}
