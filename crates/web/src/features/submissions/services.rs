use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::submission::{CreateSubmissionRequest, TrackSource},
    error::{Result, ServiceError},
    models::{Submission, User},
    repository::{PgSubmissionRepository, SubmissionRepository},
    services::rating,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebResult;
use crate::media::decode_upload;
use crate::state::AppState;

/// Resolve the track to a public URL, uploading inline files first, then
/// store the submission.
pub async fn create_submission(
    state: &AppState,
    artist: &User,
    request: &CreateSubmissionRequest,
) -> WebResult<Submission> {
    request.validate()?;

    let source = request
        .track_source()
        .map_err(|msg| ServiceError::invalid("link", msg))?;

    let track_url = match source {
        TrackSource::Link(link) => link.to_string(),
        TrackSource::File {
            filename,
            content_base64,
        } => {
            let bytes = decode_upload(content_base64, state.max_upload_bytes)
                .map_err(|e| ServiceError::invalid("file", e.to_string()))?;
            state.media.upload(filename, bytes).await?
        }
    };

    let repo = PgSubmissionRepository::new(state.db.pool());
    let submission =
        rating::create_submission(&repo, artist, request, track_url, Utc::now()).await?;

    Ok(submission)
}

pub async fn get_submission(pool: &PgPool, id: Uuid) -> Result<Submission> {
    let repo = PgSubmissionRepository::new(pool);
    repo.get_by_id(id).await
}
