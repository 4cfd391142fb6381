use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::user::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};

use crate::error::WebError;
use crate::extract::JsonBody;
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Response, WebError> {
    let user = services::register(state.db.pool(), &payload).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))).into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Response, WebError> {
    let (user, session) = services::login(state.db.pool(), &payload, state.session_ttl).await?;

    let response = LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: UserResponse::from(user),
    };

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Missing or expired session")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, WebError> {
    services::logout(state.db.pool(), &current.token).await?;

    tracing::info!(user_id = %current.user.user_id, "Logged out");

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or expired session")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(Extension(current): Extension<CurrentUser>) -> Result<Response, WebError> {
    Ok(Json(UserResponse::from(current.user)).into_response())
}
