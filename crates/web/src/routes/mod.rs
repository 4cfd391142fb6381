use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{accounts, leaderboard, rubric, submissions};
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", accounts::routes::routes(state.clone()))
        .nest("/submissions", submissions::routes::routes(state.clone()))
        .nest("/rubric", rubric::routes::routes())
        .merge(leaderboard::routes::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::state::test_state;

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = router(test_state(1024))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_rubric_routes() {
        let (status, body) = get_json("/api/rubric").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["default_genre"], "deutschrap");

        let (status, body) = get_json("/api/rubric/Polka").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], false);
        assert_eq!(body["genre"], "deutschrap");
    }

    #[tokio::test]
    async fn test_protected_routes_need_a_token() {
        let (status, body) = get_json("/api/auth/me").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let response = router(test_state(1024))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/submissions/00000000-0000-0000-0000-000000000000/rating")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_leaderboard_month_is_rejected() {
        let (status, _) = get_json("/api/leaderboard?month=Oktober").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_query_is_json_bad_request() {
        let (status, body) = get_json("/api/tracks?page=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = get_json("/api/submissions/not-a-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (status, body) = get_json("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/leaderboard"].is_object());
    }
}
