use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use super::handlers::{create_submission, get_submission};
use crate::features::ratings;
use crate::middleware::auth::require_session;
use crate::state::AppState;

/// Room left in the request body for the JSON fields around the file.
const ENVELOPE_BYTES: usize = 64 * 1024;

/// Largest request body that can carry a file of `max_upload_bytes` once it
/// is base64 encoded.
pub fn upload_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(ENVELOPE_BYTES)
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = upload_routes(state.max_upload_bytes)
        .merge(ratings::routes::routes())
        .route_layer(middleware::from_fn_with_state(state, require_session));

    Router::new()
        .route("/:id", get(get_submission))
        .merge(protected)
}

fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/",
        post(create_submission)
            .layer(DefaultBodyLimit::max(upload_body_limit(max_upload_bytes))),
    )
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use serde_json::{Value, json};
    use storage::models::User;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::middleware::auth::CurrentUser;
    use crate::state::test_state;

    fn artist() -> CurrentUser {
        CurrentUser {
            user: User {
                user_id: Uuid::new_v4(),
                username: "kira".to_string(),
                email: "kira@example.com".to_string(),
                password_hash: String::new(),
                age: 19,
                is_mentor: false,
                is_admin: false,
                created_at: Utc::now(),
            },
            token: "token".to_string(),
        }
    }

    async fn submit_file(max_upload_bytes: usize, file_bytes: usize) -> (StatusCode, Value) {
        let app = upload_routes(max_upload_bytes)
            .layer(Extension(artist()))
            .with_state(test_state(max_upload_bytes));

        // "AAAA" decodes to three zero bytes.
        let content_base64 = "AAAA".repeat(file_bytes / 3);
        let body = json!({
            "title": "Stadtrand",
            "genre": "Deutschrap",
            "file": {"filename": "stadtrand.mp3", "content_base64": content_base64}
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
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

    #[test]
    fn test_body_limit_covers_base64_growth() {
        assert_eq!(upload_body_limit(3), 4 + ENVELOPE_BYTES);
        assert_eq!(upload_body_limit(4), 8 + ENVELOPE_BYTES);
        assert!(upload_body_limit(25 * 1024 * 1024) > 25 * 1024 * 1024 * 4 / 3);
        assert_eq!(upload_body_limit(usize::MAX), usize::MAX);
    }

    #[tokio::test]
    async fn test_file_over_two_mebibytes_reaches_the_media_host() {
        let (status, body) = submit_file(25 * 1024 * 1024, 3 * 1024 * 1024).await;
        // The media host is disabled in tests, so getting its error means the
        // body was accepted and decoded.
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["hint"].is_string());
    }

    #[tokio::test]
    async fn test_file_over_the_limit_is_a_validation_error() {
        let (status, body) = submit_file(1024, 3 * 1024).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"][0].as_str().unwrap().starts_with("file:"));
    }
}
