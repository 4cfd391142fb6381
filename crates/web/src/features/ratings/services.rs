use chrono::Utc;
use storage::{
    dto::rating::{RateSubmissionRequest, ScoreBreakdown},
    error::ServiceResult,
    models::{Submission, User},
    repository::PgSubmissionRepository,
    services::rating,
};
use uuid::Uuid;

use crate::state::AppState;

pub async fn rate_submission(
    state: &AppState,
    id: Uuid,
    request: &RateSubmissionRequest,
    rater: &User,
) -> ServiceResult<(Submission, ScoreBreakdown)> {
    let repo = PgSubmissionRepository::new(state.db.pool());
    rating::rate_submission(&repo, &state.rubric, id, request, rater, Utc::now()).await
}
