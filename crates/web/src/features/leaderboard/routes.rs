use axum::{Router, routing::get};

use super::handlers::{get_leaderboard, list_tracks};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tracks", get(list_tracks))
        .route("/leaderboard", get(get_leaderboard))
}
