use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    dto::{
        common::PaginatedResponse,
        leaderboard::{LeaderboardEntry, LeaderboardFilter, TrackListFilter},
        submission::SubmissionResponse,
    },
    services::rating::submission_month,
};

use crate::error::WebError;
use crate::extract::QueryParams;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/tracks",
    params(TrackListFilter),
    responses(
        (status = 200, description = "Submissions retrieved successfully", body = PaginatedResponse<SubmissionResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "leaderboard"
)]
pub async fn list_tracks(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<TrackListFilter>,
) -> Result<Response, WebError> {
    filter.validate().map_err(WebError::BadRequest)?;

    let (submissions, total_items) = services::list_tracks(state.db.pool(), &filter).await?;

    let data: Vec<SubmissionResponse> = submissions
        .into_iter()
        .map(SubmissionResponse::from)
        .collect();
    let response = PaginatedResponse::new(data, filter.pagination(), total_items);

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(LeaderboardFilter),
    responses(
        (status = 200, description = "Leaderboard retrieved successfully", body = PaginatedResponse<LeaderboardEntry>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<LeaderboardFilter>,
) -> Result<Response, WebError> {
    filter.validate().map_err(WebError::BadRequest)?;

    let month = filter
        .month
        .clone()
        .unwrap_or_else(|| submission_month(Utc::now()));

    let (entries, total_items) = services::leaderboard(state.db.pool(), &filter, month).await?;

    let response = PaginatedResponse::new(entries, filter.pagination(), total_items);

    Ok(Json(response).into_response())
}
