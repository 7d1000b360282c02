use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{
    auth::{AuthClaims, REFRESH_TOKEN_COOKIE},
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, UnauthorizedResponse,
    },
    ValidatedJson,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::auth::{AuthService, TokenPair};
use crate::error::{AuthError, AuthResult};
use crate::models::{AccountUser, LoginRequest, LoginResponse, RegisterRequest, User};
use crate::repository::UserRepository;

const TAG: &str = "auth";

/// OpenAPI documentation for the Auth API
#[derive(OpenApi)]
#[openapi(
    paths(login, account, refresh, logout, register),
    components(
        schemas(LoginRequest, LoginResponse, AccountUser, RegisterRequest, User),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Authentication endpoints")
    )
)]
pub struct ApiDoc;

/// Create the auth router with all HTTP endpoints
pub fn auth_router<R: UserRepository + 'static>(service: AuthService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/login", post(login))
        .route("/account", get(account))
        .route("/refresh", get(refresh))
        .route("/logout", post(logout))
        .route("/register", post(register))
        .with_state(shared_service)
}

fn refresh_cookie(token: &str, max_age: i64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        REFRESH_TOKEN_COOKIE, token, max_age
    )
}

fn expired_refresh_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", REFRESH_TOKEN_COOKIE)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let mut parts = cookie.trim().splitn(2, '=');
                match (parts.next(), parts.next()) {
                    (Some(key), Some(value)) if key == name => Some(value.to_string()),
                    _ => None,
                }
            })
        })
}

fn token_response(refresh_ttl: i64, pair: TokenPair) -> impl IntoResponse {
    let cookie = refresh_cookie(&pair.refresh_token, refresh_ttl);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(pair.response),
    )
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; refresh token set as HttpOnly cookie", body = LoginResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<AuthService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AuthResult<impl IntoResponse> {
    let pair = service.login(input).await?;
    Ok(token_response(service.refresh_token_ttl(), pair))
}

/// Current user profile from the bearer token
#[utoipa::path(
    get,
    path = "/account",
    tag = TAG,
    responses(
        (status = 200, description = "Current user", body = AccountUser),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn account<R: UserRepository>(
    State(service): State<Arc<AuthService<R>>>,
    claims: AuthClaims,
) -> AuthResult<Json<AccountUser>> {
    let user = service.account(&claims.0).await?;
    Ok(Json(user))
}

/// Rotate tokens using the refresh token cookie
#[utoipa::path(
    get,
    path = "/refresh",
    tag = TAG,
    responses(
        (status = 200, description = "Fresh token pair; new refresh cookie set", body = LoginResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn refresh<R: UserRepository>(
    State(service): State<Arc<AuthService<R>>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse> {
    let token = cookie_value(&headers, REFRESH_TOKEN_COOKIE)
        .ok_or_else(|| AuthError::Unauthorized("No refresh token cookie".to_string()))?;

    let pair = service.refresh(&token).await?;
    Ok(token_response(service.refresh_token_ttl(), pair))
}

/// Log out, clearing the stored refresh token and expiring the cookie
#[utoipa::path(
    post,
    path = "/logout",
    tag = TAG,
    responses(
        (status = 200, description = "Logged out; refresh cookie expired"),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn logout<R: UserRepository>(
    State(service): State<Arc<AuthService<R>>>,
    claims: AuthClaims,
) -> AuthResult<impl IntoResponse> {
    service.logout(&claims.0).await?;
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, expired_refresh_cookie())],
    ))
}

/// Public self-registration
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<AuthService<R>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AuthResult<impl IntoResponse> {
    let user = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;
    use axum::body::Body;
    use axum::http::Request;
    use axum_helpers::auth::{optional_jwt_auth_middleware, JwtAuth, JwtConfig};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_jwt() -> JwtAuth {
        let secret = BASE64.encode([5u8; 64]);
        JwtAuth::new(&JwtConfig::new(secret)).unwrap()
    }

    fn test_app() -> Router {
        let jwt = test_jwt();
        auth_router(AuthService::new(InMemoryUserRepository::new(), jwt.clone())).layer(
            axum::middleware::from_fn_with_state(jwt, optional_jwt_auth_middleware),
        )
    }

    async fn register_ada(app: &Router) {
        let response = app
            .clone()
            .oneshot(
                Request::post("/register")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"name":"Ada","email":"ada@example.com","password":"secret123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_register_and_login_sets_refresh_cookie() {
        let app = test_app();
        register_ada(&app).await;

        let response = app
            .oneshot(
                Request::post("/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"username":"ada@example.com","password":"secret123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("refresh_token="));
        assert!(cookie.contains("HttpOnly"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["access_token"].as_str().unwrap().contains('.'));
        assert_eq!(body["user"]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_401() {
        let app = test_app();
        register_ada(&app).await;

        let response = app
            .oneshot(
                Request::post("/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"username":"ada@example.com","password":"wrong-one"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_account_requires_token() {
        let app = test_app();

        let response = app
            .oneshot(Request::get("/account").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_account_with_bearer_token() {
        let app = test_app();
        register_ada(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"username":"ada@example.com","password":"secret123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let token = body["access_token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::get("/account")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let account: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(account["name"], "Ada");
    }

    #[tokio::test]
    async fn test_refresh_without_cookie_is_401() {
        let app = test_app();

        let response = app
            .oneshot(Request::get("/refresh").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_with_cookie_rotates_tokens() {
        let app = test_app();
        register_ada(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"username":"ada@example.com","password":"secret123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let token_pair = cookie.split(';').next().unwrap().to_string();

        let response = app
            .oneshot(
                Request::get("/refresh")
                    .header(header::COOKIE, token_pair)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }
}
