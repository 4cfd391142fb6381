use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Scoring criteria of the rubric, in the fixed order used for summation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    HistoricalReference,
    Creativity,
    TechnicalQuality,
    CommunityFeedback,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::HistoricalReference,
        Criterion::Creativity,
        Criterion::TechnicalQuality,
        Criterion::CommunityFeedback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HistoricalReference => "historical_reference",
            Self::Creativity => "creativity",
            Self::TechnicalQuality => "technical_quality",
            Self::CommunityFeedback => "community_feedback",
        }
    }
}

/// Raw per-criterion scores given by a rater, each in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RawScores {
    pub historical_reference: i32,
    pub creativity: i32,
    pub technical_quality: i32,
    pub community_feedback: i32,
}

impl RawScores {
    pub fn get(&self, criterion: Criterion) -> i32 {
        match criterion {
            Criterion::HistoricalReference => self.historical_reference,
            Criterion::Creativity => self.creativity,
            Criterion::TechnicalQuality => self.technical_quality,
            Criterion::CommunityFeedback => self.community_feedback,
        }
    }
}

/// One entered track.
///
/// `raw_scores` stays `None` until the first rating; `final_score` is `0.0`
/// until then and is recomputed in full on every rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Submission {
    pub submission_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub track_url: String,
    pub genre: Option<String>,
    pub artist_age: i32,
    pub month: String,
    pub bonus: i32,
    pub raw_scores: Option<RawScores>,
    pub final_score: f64,
    pub feedback: Option<String>,
    pub rated_by: Option<Uuid>,
    pub rated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn is_rated(&self) -> bool {
        self.raw_scores.is_some()
    }
}

/// Flat row as stored in the `submissions` table.
#[derive(Debug, FromRow)]
pub struct SubmissionRow {
    pub submission_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub track_url: String,
    pub genre: Option<String>,
    pub artist_age: i32,
    pub month: String,
    pub bonus: i32,
    pub historical_reference: Option<i32>,
    pub creativity: Option<i32>,
    pub technical_quality: Option<i32>,
    pub community_feedback: Option<i32>,
    pub final_score: f64,
    pub feedback: Option<String>,
    pub rated_by: Option<Uuid>,
    pub rated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<SubmissionRow> for Submission {
    fn from(row: SubmissionRow) -> Self {
        // The four score columns are always written together.
        let raw_scores = match (
            row.historical_reference,
            row.creativity,
            row.technical_quality,
            row.community_feedback,
        ) {
            (Some(h), Some(c), Some(t), Some(f)) => Some(RawScores {
                historical_reference: h,
                creativity: c,
                technical_quality: t,
                community_feedback: f,
            }),
            _ => None,
        };

        Self {
            submission_id: row.submission_id,
            user_id: row.user_id,
            title: row.title,
            track_url: row.track_url,
            genre: row.genre,
            artist_age: row.artist_age,
            month: row.month,
            bonus: row.bonus,
            raw_scores,
            final_score: row.final_score,
            feedback: row.feedback,
            rated_by: row.rated_by,
            rated_at: row.rated_at,
            created_at: row.created_at,
        }
    }
}
