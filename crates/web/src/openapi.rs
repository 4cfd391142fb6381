use utoipa::OpenApi;

use crate::features::{accounts, leaderboard, ratings, rubric, submissions};

#[derive(OpenApi)]
#[openapi(
    paths(
        accounts::handlers::register,
        accounts::handlers::login,
        accounts::handlers::logout,
        accounts::handlers::me,
        submissions::handlers::create_submission,
        submissions::handlers::get_submission,
        ratings::handlers::rate_submission,
        leaderboard::handlers::list_tracks,
        leaderboard::handlers::get_leaderboard,
        rubric::handlers::get_rubric,
        rubric::handlers::get_genre_weights,
    ),
    components(
        schemas(
            storage::dto::user::RegisterRequest,
            storage::dto::user::LoginRequest,
            storage::dto::user::LoginResponse,
            storage::dto::user::UserResponse,
            storage::dto::submission::CreateSubmissionRequest,
            storage::dto::submission::UploadedFile,
            storage::dto::submission::SubmissionResponse,
            storage::dto::submission::SubmissionStatus,
            storage::dto::rating::RateSubmissionRequest,
            storage::dto::rating::RatingResponse,
            storage::dto::rating::ScoreBreakdown,
            storage::dto::rating::CriterionContribution,
            storage::dto::leaderboard::LeaderboardEntry,
            storage::dto::leaderboard::SubmissionOrder,
            storage::dto::rubric::RubricResponse,
            storage::dto::rubric::GenreWeightsResponse,
            storage::dto::rubric::CriterionWeight,
            storage::dto::common::PaginationMeta,
            storage::models::Criterion,
            storage::models::RawScores,
            storage::models::Role,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and sessions"),
        (name = "submissions", description = "Track submissions"),
        (name = "ratings", description = "Mentor ratings"),
        (name = "leaderboard", description = "Public track lists and rankings"),
        (name = "rubric", description = "Scoring rubric"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("Session token")
                        .build(),
                ),
            )
        }
    }
}
