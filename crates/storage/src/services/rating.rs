use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::dto::rating::{RateSubmissionRequest, ScoreBreakdown};
use crate::dto::submission::CreateSubmissionRequest;
use crate::error::{ServiceError, ServiceResult};
use crate::models::rubric::normalize_genre;
use crate::models::{RubricStore, Submission, User};
use crate::repository::{NewSubmission, RatingUpdate, SubmissionRepository};

use super::score_computation::{compute_final_score, score_breakdown, youth_bonus};

/// Competition month a submission made at `now` belongs to, as `YYYY-MM`.
pub fn submission_month(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// Store a new, unrated submission for `artist`.
///
/// `track_url` is the already-resolved public location of the track. The
/// youth bonus is derived from the artist's age here and never changes.
pub async fn create_submission(
    repo: &dyn SubmissionRepository,
    artist: &User,
    request: &CreateSubmissionRequest,
    track_url: String,
    now: DateTime<Utc>,
) -> ServiceResult<Submission> {
    request.validate()?;
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ServiceError::invalid("title", "Title must not be blank"));
    }

    let genre = request
        .genre
        .as_deref()
        .map(normalize_genre)
        .filter(|g| !g.is_empty());

    let new_submission = NewSubmission {
        user_id: artist.user_id,
        title: title.to_string(),
        track_url,
        genre,
        artist_age: artist.age,
        month: submission_month(now),
        bonus: youth_bonus(artist.age),
        created_at: now,
    };

    let submission = repo.create(&new_submission).await?;

    tracing::info!(
        submission_id = %submission.submission_id,
        user_id = %artist.user_id,
        month = %submission.month,
        bonus = submission.bonus,
        "Submission created"
    );

    Ok(submission)
}

/// Only mentors and admins may rate, whatever the request contains.
pub fn ensure_can_rate(rater: &User) -> ServiceResult<()> {
    let role = rater.role();
    if role.can_rate() {
        Ok(())
    } else {
        Err(ServiceError::Permission(format!(
            "role '{}' may not rate submissions",
            role.as_str()
        )))
    }
}

/// Rate a submission and persist the recomputed final score.
///
/// Checks run in a fixed order: the rater's role, then the scores, then the
/// submission's existence. Nothing is written unless all of them pass, and
/// the rating is stored with a single update so a failed write leaves the
/// previous rating in place. Rating again overwrites the previous rating.
pub async fn rate_submission(
    repo: &dyn SubmissionRepository,
    rubric: &RubricStore,
    submission_id: Uuid,
    request: &RateSubmissionRequest,
    rater: &User,
    now: DateTime<Utc>,
) -> ServiceResult<(Submission, ScoreBreakdown)> {
    ensure_can_rate(rater)?;

    request.validate()?;

    let submission = repo.get_by_id(submission_id).await?;

    let weights = rubric.weights_for(submission.genre.as_deref());
    let raw_scores = request.raw_scores();
    let final_score = compute_final_score(&raw_scores, weights, submission.bonus);

    let update = RatingUpdate {
        raw_scores,
        final_score,
        feedback: request.normalized_feedback(),
        rated_by: rater.user_id,
        rated_at: now,
    };

    let updated = repo.update_rating(submission_id, &update).await.map_err(|e| {
        tracing::warn!(%submission_id, error = %e, "Failed to store rating");
        ServiceError::from(e)
    })?;

    tracing::info!(
        %submission_id,
        rated_by = %rater.user_id,
        final_score,
        "Submission rated"
    );

    let breakdown = score_breakdown(&raw_scores, weights, updated.bonus);

    Ok((updated, breakdown))
}
