use axum::{Router, routing::post};

use super::handlers::rate_submission;
use crate::state::AppState;

/// Mounted under `/api/submissions` behind the session layer.
pub fn routes() -> Router<AppState> {
    Router::new().route("/:id/rating", post(rate_submission))
}
