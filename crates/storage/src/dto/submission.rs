use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{RawScores, Submission};

/// Request payload for entering a track.
///
/// Exactly one of `link` and `file` must be given.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSubmissionRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,

    #[validate(length(min = 1, max = 50))]
    pub genre: Option<String>,

    #[validate(url(message = "Link must be a valid URL"))]
    #[validate(length(max = 2048))]
    pub link: Option<String>,

    #[validate(nested)]
    pub file: Option<UploadedFile>,
}

/// Track file sent inline as base64.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UploadedFile {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,

    #[validate(length(min = 1))]
    pub content_base64: String,
}

/// Where the track comes from once the request has been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSource<'a> {
    Link(&'a str),
    File {
        filename: &'a str,
        content_base64: &'a str,
    },
}

impl CreateSubmissionRequest {
    pub fn track_source(&self) -> Result<TrackSource<'_>, String> {
        match (&self.link, &self.file) {
            (Some(link), None) => {
                let link = link.trim();
                if link.starts_with("https://") || link.starts_with("http://") {
                    Ok(TrackSource::Link(link))
                } else {
                    Err("link must be an http or https URL".to_string())
                }
            }
            (None, Some(file)) => Ok(TrackSource::File {
                filename: &file.filename,
                content_base64: &file.content_base64,
            }),
            (Some(_), Some(_)) => Err("provide either a link or a file, not both".to_string()),
            (None, None) => Err("a link or a file is required".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Unrated,
    Rated,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    pub submission_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub track_url: String,
    pub genre: Option<String>,
    pub month: String,
    pub status: SubmissionStatus,
    pub bonus: i32,
    pub raw_scores: Option<RawScores>,
    pub final_score: f64,
    pub feedback: Option<String>,
    pub rated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        let status = if submission.is_rated() {
            SubmissionStatus::Rated
        } else {
            SubmissionStatus::Unrated
        };

        Self {
            submission_id: submission.submission_id,
            user_id: submission.user_id,
            title: submission.title,
            track_url: submission.track_url,
            genre: submission.genre,
            month: submission.month,
            status,
            bonus: submission.bonus,
            raw_scores: submission.raw_scores,
            final_score: submission.final_score,
            feedback: submission.feedback,
            rated_at: submission.rated_at,
            created_at: submission.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(link: Option<&str>, file: Option<UploadedFile>) -> CreateSubmissionRequest {
        CreateSubmissionRequest {
            title: "Stadtrand".to_string(),
            genre: Some("deutschrap".to_string()),
            link: link.map(str::to_string),
            file,
        }
    }

    fn file() -> UploadedFile {
        UploadedFile {
            filename: "stadtrand.mp3".to_string(),
            content_base64: "SUQz".to_string(),
        }
    }

    #[test]
    fn test_link_source() {
        let req = request(Some("https://soundcloud.com/x/stadtrand"), None);
        assert!(req.validate().is_ok());
        assert_eq!(
            req.track_source(),
            Ok(TrackSource::Link("https://soundcloud.com/x/stadtrand"))
        );
    }

    #[test]
    fn test_file_source() {
        let req = request(None, Some(file()));
        assert!(matches!(
            req.track_source(),
            Ok(TrackSource::File {
                filename: "stadtrand.mp3",
                ..
            })
        ));
    }

    #[test]
    fn test_source_must_be_exactly_one() {
        assert!(request(None, None).track_source().is_err());
        assert!(
            request(Some("https://example.org/a.mp3"), Some(file()))
                .track_source()
                .is_err()
        );
    }

    #[test]
    fn test_non_http_link_is_rejected() {
        let req = request(Some("ftp://example.org/a.mp3"), None);
        assert!(req.track_source().is_err());
    }

    #[test]
    fn test_empty_title_is_invalid() {
        let mut req = request(Some("https://example.org/a.mp3"), None);
        req.title = String::new();
        assert!(req.validate().is_err());
    }
}
