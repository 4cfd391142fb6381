use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::dto::rubric::{GenreWeightsResponse, RubricResponse};

use crate::error::WebError;
use crate::extract::PathParam;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/rubric",
    responses(
        (status = 200, description = "Configured genres and their weights", body = RubricResponse)
    ),
    tag = "rubric"
)]
pub async fn get_rubric(State(state): State<AppState>) -> Result<Response, WebError> {
    Ok(Json(services::rubric_overview(&state.rubric)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/rubric/{genre}",
    params(
        ("genre" = String, Path, description = "Genre name, case-insensitive")
    ),
    responses(
        (status = 200, description = "Weights applied to the genre", body = GenreWeightsResponse)
    ),
    tag = "rubric"
)]
pub async fn get_genre_weights(
    State(state): State<AppState>,
    PathParam(genre): PathParam<String>,
) -> Result<Response, WebError> {
    Ok(Json(services::genre_weights(&state.rubric, &genre)).into_response())
}
