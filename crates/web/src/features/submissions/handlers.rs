use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::submission::{CreateSubmissionRequest, SubmissionResponse};
use uuid::Uuid;

use crate::error::WebError;
use crate::extract::{JsonBody, PathParam};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/submissions",
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Track submitted", body = SubmissionResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or expired session"),
        (status = 502, description = "Media host upload failed")
    ),
    security(("bearer_auth" = [])),
    tag = "submissions"
)]
pub async fn create_submission(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<CreateSubmissionRequest>,
) -> Result<Response, WebError> {
    let submission = services::create_submission(&state, &current.user, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::from(submission)),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    params(
        ("id" = Uuid, Path, description = "Submission ID")
    ),
    responses(
        (status = 200, description = "Submission found", body = SubmissionResponse),
        (status = 404, description = "Submission not found")
    ),
    tag = "submissions"
)]
pub async fn get_submission(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Response, WebError> {
    let submission = services::get_submission(state.db.pool(), id).await?;

    Ok(Json(SubmissionResponse::from(submission)).into_response())
}
