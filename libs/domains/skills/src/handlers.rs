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
    pagination::{Page, PageMeta, PageQuery},
    IdPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::SkillResult;
use crate::models::{CreateSkill, Skill, UpdateSkill};
use crate::repository::SkillRepository;
use crate::service::SkillService;

const TAG: &str = "skills";

/// OpenAPI documentation for Skills API
#[derive(OpenApi)]
#[openapi(
    paths(list_skills, create_skill, get_skill, update_skill, delete_skill),
    components(
        schemas(Skill, CreateSkill, UpdateSkill, Page<Skill>, PageMeta),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestFilterResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Skill management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the skill router with all HTTP endpoints
pub fn router<R: SkillRepository + 'static>(service: SkillService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_skills).post(create_skill))
        .route(
            "/{id}",
            get(get_skill).put(update_skill).delete(delete_skill),
        )
        .with_state(shared_service)
}

/// List skills with pagination and an optional filter
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of skills", body = Page<Skill>),
        (status = 400, response = BadRequestFilterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_skills<R: SkillRepository>(
    State(service): State<Arc<SkillService<R>>>,
    Query(query): Query<PageQuery>,
) -> SkillResult<Json<Page<Skill>>> {
    let page = service.list_skills(&query).await?;
    Ok(Json(page))
}

/// Create a new skill
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateSkill,
    responses(
        (status = 201, description = "Skill created successfully", body = Skill),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_skill<R: SkillRepository>(
    State(service): State<Arc<SkillService<R>>>,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<CreateSkill>,
) -> SkillResult<impl IntoResponse> {
    let skill = service
        .create_skill(input, claims.map(|c| c.actor()))
        .await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

/// Get a skill by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Skill ID")
    ),
    responses(
        (status = 200, description = "Skill found", body = Skill),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_skill<R: SkillRepository>(
    State(service): State<Arc<SkillService<R>>>,
    IdPath(id): IdPath,
) -> SkillResult<Json<Skill>> {
    let skill = service.get_skill(id).await?;
    Ok(Json(skill))
}

/// Update a skill
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Skill ID")
    ),
    request_body = UpdateSkill,
    responses(
        (status = 200, description = "Skill updated successfully", body = Skill),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_skill<R: SkillRepository>(
    State(service): State<Arc<SkillService<R>>>,
    IdPath(id): IdPath,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<UpdateSkill>,
) -> SkillResult<Json<Skill>> {
    let skill = service
        .update_skill(id, input, claims.map(|c| c.actor()))
        .await?;
    Ok(Json(skill))
}

/// Delete a skill
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Skill ID")
    ),
    responses(
        (status = 204, description = "Skill deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_skill<R: SkillRepository>(
    State(service): State<Arc<SkillService<R>>>,
    IdPath(id): IdPath,
) -> SkillResult<impl IntoResponse> {
    service.delete_skill(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemorySkillRepository;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        router(SkillService::new(InMemorySkillRepository::new()))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_skill_returns_201() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Rust"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["name"], "Rust");
    }

    #[tokio::test]
    async fn test_create_skill_with_empty_name_returns_400() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_skills_returns_page_envelope() {
        let app = test_router();

        let response = app
            .oneshot(Request::get("/?page=1&page_size=5").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["meta"]["page"], 1);
        assert_eq!(json["meta"]["total"], 0);
        assert!(json["result"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_skills_with_malformed_filter_returns_400() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::get("/?filter=name%20~")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "MALFORMED_FILTER");
    }

    #[tokio::test]
    async fn test_get_missing_skill_returns_404() {
        let app = test_router();

        let response = app
            .oneshot(Request::get("/99").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
