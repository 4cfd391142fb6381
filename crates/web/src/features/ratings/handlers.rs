use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        rating::{RateSubmissionRequest, RatingResponse},
        submission::SubmissionResponse,
    },
    services::rating::ensure_can_rate,
};
use uuid::Uuid;

use crate::error::WebError;
use crate::extract::{JsonBody, PathParam};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/rating",
    params(
        ("id" = Uuid, Path, description = "Submission ID")
    ),
    request_body = RateSubmissionRequest,
    responses(
        (status = 200, description = "Submission rated", body = RatingResponse),
        (status = 400, description = "Scores missing, not integers or out of range"),
        (status = 401, description = "Missing or expired session"),
        (status = 403, description = "Only mentors and admins may rate"),
        (status = 404, description = "Submission not found"),
        (status = 409, description = "Submission was modified concurrently")
    ),
    security(("bearer_auth" = [])),
    tag = "ratings"
)]
pub async fn rate_submission(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    PathParam(id): PathParam<Uuid>,
    payload: Result<JsonBody<RateSubmissionRequest>, WebError>,
) -> Result<Response, WebError> {
    // Artists are refused before their scores are even looked at.
    ensure_can_rate(&current.user)?;
    let JsonBody(payload) = payload?;

    let (submission, breakdown) =
        services::rate_submission(&state, id, &payload, &current.user).await?;

    let response = RatingResponse {
        submission: SubmissionResponse::from(submission),
        breakdown,
    };

    Ok(Json(response).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        routing::post,
    };
    use chrono::Utc;
    use serde_json::Value;
    use storage::models::{Role, User};
    use tower::ServiceExt;

    use super::*;
    use crate::state::test_state;

    fn current(role: Role) -> CurrentUser {
        let (is_mentor, is_admin) = role.as_flags();
        CurrentUser {
            user: User {
                user_id: Uuid::new_v4(),
                username: "rater".to_string(),
                email: "rater@example.com".to_string(),
                password_hash: String::new(),
                age: 30,
                is_mentor,
                is_admin,
                created_at: Utc::now(),
            },
            token: "token".to_string(),
        }
    }

    async fn rate_as(role: Role, body: &str) -> (StatusCode, Value) {
        let app = Router::new()
            .route("/:id/rating", post(rate_submission))
            .layer(Extension(current(role)))
            .with_state(test_state(1024));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/{}/rating", Uuid::new_v4()))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_artist_is_forbidden_even_with_malformed_scores() {
        let body = r#"{"historical_reference": 8.5, "creativity": 8}"#;
        let (status, body) = rate_as(Role::Artist, body).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].as_str().unwrap().contains("artist"));

        let (status, _) = rate_as(Role::Artist, "not json").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_mentor_with_non_integer_score_gets_json_bad_request() {
        let body = r#"{"historical_reference": 8.5, "creativity": 8, "technical_quality": 9, "community_feedback": 7}"#;
        let (status, body) = rate_as(Role::Mentor, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
