//! Job digest delivery endpoint.
//!
//! POST /api/v1/email walks every subscriber with followed skills, finds
//! the active jobs matching those skills and mails a digest. Delivery
//! runs on a spawned task so the request returns immediately.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use axum_helpers::auth::AuthClaims;
use axum_helpers::errors::responses::{InternalServerErrorResponse, UnauthorizedResponse};
use domain_jobs::{JobService, MysqlJobRepository};
use domain_subscribers::{MysqlSubscriberRepository, SubscriberService};
use notifications_email::NotificationService;
use std::sync::Arc;
use utoipa::OpenApi;

pub const TAG: &str = "email";

#[derive(OpenApi)]
#[openapi(
    paths(send_digests),
    components(responses(UnauthorizedResponse, InternalServerErrorResponse)),
    tags(
        (name = TAG, description = "Job digest delivery")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct DigestState {
    pub subscribers: SubscriberService<MysqlSubscriberRepository>,
    pub jobs: JobService<MysqlJobRepository>,
    pub notifications: Option<Arc<NotificationService>>,
}

pub fn router(state: DigestState) -> Router {
    Router::new().route("/", post(send_digests)).with_state(state)
}

/// Kick off digest delivery for every subscriber with followed skills
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    responses(
        (status = 202, description = "Digest delivery started"),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn send_digests(
    State(state): State<DigestState>,
    _claims: AuthClaims,
) -> impl IntoResponse {
    let Some(notifications) = state.notifications.clone() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "message": "Email delivery is not configured" })),
        );
    };

    let subscribers = state.subscribers.clone();
    let jobs = state.jobs.clone();

    tokio::spawn(async move {
        let recipients = match subscribers.digest_recipients().await {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load digest recipients");
                return;
            }
        };

        for subscriber in recipients {
            let skill_ids: Vec<i64> = subscriber.skills.iter().map(|s| s.id).collect();
            match jobs.find_active_by_skill_ids(skill_ids).await {
                Ok(matching) => {
                    if let Err(e) = notifications.send_job_digest(&subscriber, &matching).await {
                        tracing::warn!(
                            subscriber_id = subscriber.id,
                            error = %e,
                            "Failed to send job digest"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        subscriber_id = subscriber.id,
                        error = %e,
                        "Failed to load matching jobs for digest"
                    );
                }
            }
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "message": "Digest delivery started" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // the spawned delivery task clones the state, so every field must be Clone
    #[test]
    fn test_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<DigestState>();
    }
}
