//! Merged OpenAPI document for the whole API surface.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "JobHunter API",
        description = "Job board backend: authentication, companies, jobs, resumes and digest notifications",
        version = env!("CARGO_PKG_VERSION")
    ),
    nest(
        (path = "/api/v1/auth", api = domain_users::auth_handlers::ApiDoc),
        (path = "/api/v1/companies", api = domain_companies::handlers::ApiDoc),
        (path = "/api/v1/users", api = domain_users::handlers::ApiDoc),
        (path = "/api/v1/jobs", api = domain_jobs::handlers::ApiDoc),
        (path = "/api/v1/skills", api = domain_skills::handlers::ApiDoc),
        (path = "/api/v1/resumes", api = domain_resumes::handlers::ApiDoc),
        (path = "/api/v1/roles", api = domain_roles::handlers::ApiDoc),
        (path = "/api/v1/permissions", api = domain_roles::handlers::PermissionsApiDoc),
        (path = "/api/v1/subscribers", api = domain_subscribers::handlers::ApiDoc),
        (path = "/api/v1/email", api = crate::digest::ApiDoc),
    )
)]
pub struct ApiDoc;
