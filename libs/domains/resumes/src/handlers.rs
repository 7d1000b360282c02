use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{
    auth::AuthClaims,
    errors::responses::{
        BadRequestFilterResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    pagination::{Page, PageQuery},
    IdPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ResumeResult;
use crate::models::{CreateResume, Resume, UpdateResume};
use crate::repository::ResumeRepository;
use crate::service::ResumeService;

const TAG: &str = "resumes";

/// OpenAPI documentation for Resumes API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_resumes,
        create_resume,
        my_resumes,
        get_resume,
        update_resume,
        delete_resume
    ),
    components(
        schemas(Resume, CreateResume, UpdateResume, Page<Resume>),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestFilterResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Resume management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the resume router with all HTTP endpoints
pub fn router<R: ResumeRepository + 'static>(service: ResumeService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_resumes).post(create_resume))
        .route("/by-user", post(my_resumes))
        .route(
            "/{id}",
            get(get_resume).put(update_resume).delete(delete_resume),
        )
        .with_state(shared_service)
}

/// List resumes with pagination and an optional filter.
/// Company-scoped callers only see resumes for their company's jobs.
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of resumes", body = Page<Resume>),
        (status = 400, response = BadRequestFilterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_resumes<R: ResumeRepository>(
    State(service): State<Arc<ResumeService<R>>>,
    claims: Option<AuthClaims>,
    Query(query): Query<PageQuery>,
) -> ResumeResult<Json<Page<Resume>>> {
    let page = service
        .list_resumes(&query, claims.as_ref().map(|c| &c.0))
        .await?;
    Ok(Json(page))
}

/// Submit a new resume
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateResume,
    responses(
        (status = 201, description = "Resume submitted", body = Resume),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_resume<R: ResumeRepository>(
    State(service): State<Arc<ResumeService<R>>>,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<CreateResume>,
) -> ResumeResult<impl IntoResponse> {
    let resume = service
        .create_resume(input, claims.map(|c| c.actor()))
        .await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// List the calling user's own resumes
#[utoipa::path(
    post,
    path = "/by-user",
    tag = TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of the caller's resumes", body = Page<Resume>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn my_resumes<R: ResumeRepository>(
    State(service): State<Arc<ResumeService<R>>>,
    claims: AuthClaims,
    Query(query): Query<PageQuery>,
) -> ResumeResult<Json<Page<Resume>>> {
    let page = service.my_resumes(claims.0.user.id, &query).await?;
    Ok(Json(page))
}

/// Get a resume by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Resume ID")
    ),
    responses(
        (status = 200, description = "Resume found", body = Resume),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_resume<R: ResumeRepository>(
    State(service): State<Arc<ResumeService<R>>>,
    IdPath(id): IdPath,
) -> ResumeResult<Json<Resume>> {
    let resume = service.get_resume(id).await?;
    Ok(Json(resume))
}

/// Update the review status of a resume
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Resume ID")
    ),
    request_body = UpdateResume,
    responses(
        (status = 200, description = "Status updated; candidate notified best-effort", body = Resume),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_resume<R: ResumeRepository>(
    State(service): State<Arc<ResumeService<R>>>,
    IdPath(id): IdPath,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<UpdateResume>,
) -> ResumeResult<Json<Resume>> {
    let resume = service
        .update_resume(id, input, claims.map(|c| c.actor()))
        .await?;
    Ok(Json(resume))
}

/// Delete a resume
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Resume ID")
    ),
    responses(
        (status = 204, description = "Resume deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_resume<R: ResumeRepository>(
    State(service): State<Arc<ResumeService<R>>>,
    IdPath(id): IdPath,
) -> ResumeResult<impl IntoResponse> {
    service.delete_resume(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OwnerRef;
    use crate::repository::{InMemoryResumeRepository, JobCatalogEntry};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let repo = InMemoryResumeRepository::with_catalogs(
            vec![OwnerRef {
                id: 1,
                name: "Ada".to_string(),
            }],
            vec![JobCatalogEntry {
                id: 10,
                name: "Backend Engineer".to_string(),
                company_id: Some(100),
            }],
        );
        router(ResumeService::new(repo))
    }

    #[tokio::test]
    async fn test_submit_resume_starts_pending() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email":"ada@example.com","url":"https://cv.example.com/ada.pdf","user_id":1,"job_id":10}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let created: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(created["status"], "PENDING");
        assert_eq!(created["job"]["name"], "Backend Engineer");
    }

    #[tokio::test]
    async fn test_submit_for_unknown_job_is_400() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email":"ada@example.com","url":"https://cv.example.com/ada.pdf","user_id":1,"job_id":99}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_by_user_requires_auth() {
        let app = test_router();

        let response = app
            .oneshot(Request::post("/by-user").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_status_with_bad_value_is_400() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::put("/1")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"status":"SHREDDED"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
