use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    auth::AuthClaims,
    errors::responses::{
        BadRequestFilterResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
    pagination::{Page, PageQuery},
    IdPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::JobResult;
use crate::models::{CreateJob, Job, UpdateJob};
use crate::repository::JobRepository;
use crate::service::JobService;

const TAG: &str = "jobs";

/// OpenAPI documentation for Jobs API
#[derive(OpenApi)]
#[openapi(
    paths(list_jobs, create_job, get_job, update_job, delete_job),
    components(
        schemas(Job, CreateJob, UpdateJob, Page<Job>),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestFilterResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Job management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the job router with all HTTP endpoints
pub fn router<R: JobRepository + 'static>(service: JobService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/{id}", get(get_job).put(update_job).delete(delete_job))
        .with_state(shared_service)
}

/// List jobs with pagination and an optional filter
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of jobs", body = Page<Job>),
        (status = 400, response = BadRequestFilterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_jobs<R: JobRepository>(
    State(service): State<Arc<JobService<R>>>,
    Query(query): Query<PageQuery>,
) -> JobResult<Json<Page<Job>>> {
    let page = service.list_jobs(&query).await?;
    Ok(Json(page))
}

/// Create a new job
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateJob,
    responses(
        (status = 201, description = "Job created successfully", body = Job),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_job<R: JobRepository>(
    State(service): State<Arc<JobService<R>>>,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<CreateJob>,
) -> JobResult<impl IntoResponse> {
    let job = service.create_job(input, claims.map(|c| c.actor())).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// Get a job by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = Job),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_job<R: JobRepository>(
    State(service): State<Arc<JobService<R>>>,
    IdPath(id): IdPath,
) -> JobResult<Json<Job>> {
    let job = service.get_job(id).await?;
    Ok(Json(job))
}

/// Update a job
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Job ID")
    ),
    request_body = UpdateJob,
    responses(
        (status = 200, description = "Job updated successfully", body = Job),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_job<R: JobRepository>(
    State(service): State<Arc<JobService<R>>>,
    IdPath(id): IdPath,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<UpdateJob>,
) -> JobResult<Json<Job>> {
    let job = service
        .update_job(id, input, claims.map(|c| c.actor()))
        .await?;
    Ok(Json(job))
}

/// Delete a job
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Job deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_job<R: JobRepository>(
    State(service): State<Arc<JobService<R>>>,
    IdPath(id): IdPath,
) -> JobResult<impl IntoResponse> {
    service.delete_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkillRef;
    use crate::repository::InMemoryJobRepository;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let repo = InMemoryJobRepository::with_catalogs(
            Vec::new(),
            vec![SkillRef {
                id: 1,
                name: "Rust".to_string(),
            }],
        );
        router(JobService::new(repo))
    }

    #[tokio::test]
    async fn test_create_job_embeds_skill_names() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"name":"Backend Engineer","level":"SENIOR","skill_ids":[1,99]}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let created: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(created["skills"][0]["name"], "Rust");
        assert_eq!(created["skills"].as_array().unwrap().len(), 1);
        assert_eq!(created["level"], "SENIOR");
    }

    #[tokio::test]
    async fn test_create_job_with_bad_level_is_400() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Backend","level":"WIZARD"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_missing_job_is_404() {
        let app = test_router();

        let response = app
            .oneshot(Request::get("/5").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_filter_is_400() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::get("/?filter=salary%20%3E")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
