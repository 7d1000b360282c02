//! JobHunter API server.
//!
//! Wires the domain routers behind JWT authentication and the role
//! permission guard, runs migrations on startup and serves the merged
//! OpenAPI documentation.

mod digest;
mod guard;
mod openapi;
mod routes;
mod scope;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_helpers::auth::{JwtAuth, JwtConfig};
use axum_helpers::server::{
    create_production_app, create_router, health_router, run_health_checks, HealthCheckFuture,
};
use core_config::{
    app_info,
    server::ServerConfig,
    tracing::{init_tracing, install_color_eyre},
    Environment, FromEnv,
};
use database::mysql::{check_health, connect_from_config_with_retry, run_migrations, MysqlConfig};
use migration::Migrator;
use notifications_email::{NotificationService, SmtpProvider};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();
    let environment = Environment::from_env();
    init_tracing(&environment);

    let server_config = ServerConfig::from_env()?;
    let database_config = MysqlConfig::from_env()?;
    let jwt_config = JwtConfig::from_env()?;

    let db = connect_from_config_with_retry(database_config, None).await?;
    run_migrations::<Migrator>(&db, "jobhunter-api").await?;

    let jwt = JwtAuth::new(&jwt_config)?;

    let notifications = if std::env::var("SMTP_HOST").is_ok() {
        let provider = SmtpProvider::from_env()?;
        Some(Arc::new(NotificationService::new(Arc::new(provider))?))
    } else {
        tracing::info!("SMTP_HOST not set, email delivery disabled");
        None
    };

    let apis = routes::api_router(db.clone(), jwt, notifications);
    let router = create_router::<openapi::ApiDoc>(apis)
        .await?
        .merge(health_router(app_info!()))
        .merge(ready_router(db.clone()));

    let cleanup_db = db.clone();
    create_production_app(router, &server_config, Duration::from_secs(30), async move {
        cleanup_db.close().await.ok();
    })
    .await?;

    Ok(())
}

fn ready_router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(db)
}

async fn ready_handler(State(db): State<DatabaseConnection>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "database",
        Box::pin(async move { check_health(&db).await.map_err(|e| e.to_string()) }),
    )];

    match run_health_checks(checks).await {
        Ok(ready) => ready.into_response(),
        Err(not_ready) => not_ready.into_response(),
    }
}
