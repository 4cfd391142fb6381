use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Criterion, RawScores};

use super::submission::SubmissionResponse;

/// Rating given by a mentor or admin; every score must be in `0..=10`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RateSubmissionRequest {
    #[validate(range(min = 0, max = 10, message = "Score must be between 0 and 10"))]
    pub historical_reference: i32,

    #[validate(range(min = 0, max = 10, message = "Score must be between 0 and 10"))]
    pub creativity: i32,

    #[validate(range(min = 0, max = 10, message = "Score must be between 0 and 10"))]
    pub technical_quality: i32,

    #[validate(range(min = 0, max = 10, message = "Score must be between 0 and 10"))]
    pub community_feedback: i32,

    #[validate(length(max = 2000, message = "Feedback must be at most 2000 characters"))]
    pub feedback: Option<String>,
}

impl RateSubmissionRequest {
    pub fn raw_scores(&self) -> RawScores {
        RawScores {
            historical_reference: self.historical_reference,
            creativity: self.creativity,
            technical_quality: self.technical_quality,
            community_feedback: self.community_feedback,
        }
    }

    /// Feedback with surrounding whitespace removed; blank feedback is `None`.
    pub fn normalized_feedback(&self) -> Option<String> {
        self.feedback
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
    }
}

/// Weighted contribution of one criterion to the final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CriterionContribution {
    pub criterion: Criterion,
    pub raw_score: i32,
    pub weight: f64,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoreBreakdown {
    pub contributions: Vec<CriterionContribution>,
    pub bonus: i32,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatingResponse {
    pub submission: SubmissionResponse,
    pub breakdown: ScoreBreakdown,
}
