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

use crate::error::CompanyResult;
use crate::models::{Company, CreateCompany, UpdateCompany};
use crate::repository::CompanyRepository;
use crate::service::CompanyService;

const TAG: &str = "companies";

/// OpenAPI documentation for Companies API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_companies,
        create_company,
        get_company,
        update_company,
        delete_company
    ),
    components(
        schemas(Company, CreateCompany, UpdateCompany, Page<Company>),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestFilterResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Company management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the company router with all HTTP endpoints
pub fn router<R: CompanyRepository + 'static>(service: CompanyService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route(
            "/{id}",
            get(get_company).put(update_company).delete(delete_company),
        )
        .with_state(shared_service)
}

/// List companies with pagination and an optional filter
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of companies", body = Page<Company>),
        (status = 400, response = BadRequestFilterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_companies<R: CompanyRepository>(
    State(service): State<Arc<CompanyService<R>>>,
    Query(query): Query<PageQuery>,
) -> CompanyResult<Json<Page<Company>>> {
    let page = service.list_companies(&query).await?;
    Ok(Json(page))
}

/// Create a new company
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateCompany,
    responses(
        (status = 201, description = "Company created successfully", body = Company),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_company<R: CompanyRepository>(
    State(service): State<Arc<CompanyService<R>>>,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<CreateCompany>,
) -> CompanyResult<impl IntoResponse> {
    let company = service
        .create_company(input, claims.map(|c| c.actor()))
        .await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// Get a company by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Company found", body = Company),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_company<R: CompanyRepository>(
    State(service): State<Arc<CompanyService<R>>>,
    IdPath(id): IdPath,
) -> CompanyResult<Json<Company>> {
    let company = service.get_company(id).await?;
    Ok(Json(company))
}

/// Update a company
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Company ID")
    ),
    request_body = UpdateCompany,
    responses(
        (status = 200, description = "Company updated successfully", body = Company),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_company<R: CompanyRepository>(
    State(service): State<Arc<CompanyService<R>>>,
    IdPath(id): IdPath,
    claims: Option<AuthClaims>,
    ValidatedJson(input): ValidatedJson<UpdateCompany>,
) -> CompanyResult<Json<Company>> {
    let company = service
        .update_company(id, input, claims.map(|c| c.actor()))
        .await?;
    Ok(Json(company))
}

/// Delete a company together with its users
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Company ID")
    ),
    responses(
        (status = 204, description = "Company deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_company<R: CompanyRepository>(
    State(service): State<Arc<CompanyService<R>>>,
    IdPath(id): IdPath,
) -> CompanyResult<impl IntoResponse> {
    service.delete_company(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
