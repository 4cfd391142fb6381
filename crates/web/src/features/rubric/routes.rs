use axum::{Router, routing::get};

use super::handlers::{get_genre_weights, get_rubric};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_rubric))
        .route("/:genre", get(get_genre_weights))
}
