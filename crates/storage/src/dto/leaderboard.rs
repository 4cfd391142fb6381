use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{PaginationParams, default_page, default_page_size};
use crate::models::Submission;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionOrder {
    /// Highest final score first, earlier entries win ties.
    #[default]
    Score,
    Newest,
    Oldest,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrackListFilter {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub order: SubmissionOrder,
    /// Month in `YYYY-MM` form
    pub month: Option<String>,
    pub genre: Option<String>,
}

impl TrackListFilter {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.pagination().validate()?;

        if let Some(ref month) = self.month {
            validate_month(month)?;
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardFilter {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Month in `YYYY-MM` form, defaults to the current month
    pub month: Option<String>,
    pub genre: Option<String>,
}

impl LeaderboardFilter {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.pagination().validate()?;

        if let Some(ref month) = self.month {
            validate_month(month)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub submission_id: Uuid,
    pub artist: String,
    pub title: String,
    pub track_url: String,
    pub genre: Option<String>,
    pub final_score: f64,
    pub bonus: i32,
    pub rated: bool,
}

impl LeaderboardEntry {
    pub fn new(rank: i64, artist: String, submission: Submission) -> Self {
        let rated = submission.is_rated();
        Self {
            rank,
            submission_id: submission.submission_id,
            artist,
            title: submission.title,
            track_url: submission.track_url,
            genre: submission.genre,
            final_score: submission.final_score,
            bonus: submission.bonus,
            rated,
        }
    }
}

/// Stored months are zero-padded, so `2026-1` would never match anything.
fn validate_month(month: &str) -> Result<(), String> {
    let error = || "month must be in YYYY-MM format".to_string();

    let shaped = month.len() == 7
        && month
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 { b == b'-' } else { b.is_ascii_digit() });
    if !shaped {
        return Err(error());
    }

    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| error())
}
