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

use crate::error::SubscriberResult;
use crate::models::{CreateSubscriber, Subscriber, UpdateSubscriber};
use crate::repository::SubscriberRepository;
use crate::service::SubscriberService;

const TAG: &str = "subscribers";

/// OpenAPI documentation for Subscribers API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_subscribers,
        create_subscriber,
        my_subscription,
        get_subscriber,
        update_subscriber,
        delete_subscriber
    ),
    components(
        schemas(Subscriber, CreateSubscriber, UpdateSubscriber, Page<Subscriber>),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestFilterResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Job digest subscriber endpoints")
    )
)]
pub struct ApiDoc;

/// Create the subscriber router with all HTTP endpoints
pub fn router<R: SubscriberRepository + 'static>(service: SubscriberService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_subscribers).post(create_subscriber))
        .route("/skills", post(my_subscription))
        .route(
            "/{id}",
            get(get_subscriber)
                .put(update_subscriber)
                .delete(delete_subscriber),
        )
        .with_state(shared_service)
}

/// List subscribers with pagination and an optional filter
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of subscribers", body = Page<Subscriber>),
        (status = 400, response = BadRequestFilterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_subscribers<R: SubscriberRepository>(
    State(service): State<Arc<SubscriberService<R>>>,
    Query(query): Query<PageQuery>,
) -> SubscriberResult<Json<Page<Subscriber>>> {
    let page = service.list_subscribers(&query).await?;
    Ok(Json(page))
}

/// Register a new subscriber
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateSubscriber,
    responses(
        (status = 201, description = "Subscriber registered", body = Subscriber),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_subscriber<R: SubscriberRepository>(
    State(service): State<Arc<SubscriberService<R>>>,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<CreateSubscriber>,
) -> SubscriberResult<impl IntoResponse> {
    let subscriber = service
        .create_subscriber(input, claims.map(|c| c.actor()))
        .await?;
    Ok((StatusCode::CREATED, Json(subscriber)))
}

/// The calling user's own subscription, looked up by the token email
#[utoipa::path(
    post,
    path = "/skills",
    tag = TAG,
    responses(
        (status = 200, description = "The caller's subscription, or null when not subscribed", body = Option<Subscriber>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn my_subscription<R: SubscriberRepository>(
    State(service): State<Arc<SubscriberService<R>>>,
    claims: AuthClaims,
) -> SubscriberResult<Json<Option<Subscriber>>> {
    let subscriber = service.subscription_for_email(&claims.0.user.email).await?;
    Ok(Json(subscriber))
}

/// Get a subscriber by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Subscriber ID")
    ),
    responses(
        (status = 200, description = "Subscriber found", body = Subscriber),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_subscriber<R: SubscriberRepository>(
    State(service): State<Arc<SubscriberService<R>>>,
    IdPath(id): IdPath,
) -> SubscriberResult<Json<Subscriber>> {
    let subscriber = service.get_subscriber(id).await?;
    Ok(Json(subscriber))
}

/// Update a subscriber's name or followed skills
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Subscriber ID")
    ),
    request_body = UpdateSubscriber,
    responses(
        (status = 200, description = "Subscriber updated", body = Subscriber),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_subscriber<R: SubscriberRepository>(
    State(service): State<Arc<SubscriberService<R>>>,
    IdPath(id): IdPath,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<UpdateSubscriber>,
) -> SubscriberResult<Json<Subscriber>> {
    let subscriber = service
        .update_subscriber(id, input, claims.map(|c| c.actor()))
        .await?;
    Ok(Json(subscriber))
}

/// Delete a subscriber
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Subscriber ID")
    ),
    responses(
        (status = 204, description = "Subscriber deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_subscriber<R: SubscriberRepository>(
    State(service): State<Arc<SubscriberService<R>>>,
    IdPath(id): IdPath,
) -> SubscriberResult<impl IntoResponse> {
    service.delete_subscriber(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkillRef;
    use crate::repository::InMemorySubscriberRepository;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let repo = InMemorySubscriberRepository::with_catalog(vec![SkillRef {
            id: 1,
            name: "Rust".to_string(),
        }]);
        router(SubscriberService::new(repo))
    }

    #[tokio::test]
    async fn test_register_resolves_skills_dropping_unknown() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email":"ada@example.com","name":"Ada","skill_ids":[1,42]}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let created: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(created["skills"].as_array().unwrap().len(), 1);
        assert_eq!(created["skills"][0]["name"], "Rust");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_400() {
        let app = test_router();

        let body = r#"{"email":"ada@example.com","name":"Ada"}"#;
        let response = app
            .clone()
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_my_subscription_requires_auth() {
        let app = test_router();

        let response = app
            .oneshot(Request::post("/skills").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_returns_page_envelope() {
        let app = test_router();

        let response = app
            .oneshot(Request::get("/?page=1&pageSize=5").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let page: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(page["meta"]["page"], 1);
        assert_eq!(page["meta"]["pageSize"], 5);
        assert_eq!(page["meta"]["total"], 0);
        assert!(page["result"].as_array().unwrap().is_empty());
    }
}
