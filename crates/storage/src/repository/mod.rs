use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dto::leaderboard::SubmissionOrder;
use crate::error::Result;
use crate::models::{RawScores, Role, Session, Submission, User};

pub mod memory;
pub mod session;
pub mod submission;
pub mod user;

pub use memory::{InMemorySessionRepository, InMemorySubmissionRepository, InMemoryUserRepository};
pub use session::PgSessionRepository;
pub use submission::PgSubmissionRepository;
pub use user::PgUserRepository;

/// Fields of a submission fixed at creation time.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: Uuid,
    pub title: String,
    pub track_url: String,
    pub genre: Option<String>,
    pub artist_age: i32,
    pub month: String,
    pub bonus: i32,
    pub created_at: DateTime<Utc>,
}

/// Everything a rating overwrites, written in one statement.
#[derive(Debug, Clone)]
pub struct RatingUpdate {
    pub raw_scores: RawScores,
    pub final_score: f64,
    pub feedback: Option<String>,
    pub rated_by: Uuid,
    pub rated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionQuery {
    pub order: SubmissionOrder,
    pub month: Option<String>,
    /// Normalized genre key
    pub genre: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(&self, submission: &NewSubmission) -> Result<Submission>;

    async fn get_by_id(&self, id: Uuid) -> Result<Submission>;

    /// Overwrite the rating of a submission. A write conflict reported by the
    /// store surfaces as [`StorageError::Conflict`](crate::error::StorageError::Conflict).
    async fn update_rating(&self, id: Uuid, rating: &RatingUpdate) -> Result<Submission>;

    async fn list_all(&self, query: &SubmissionQuery) -> Result<Vec<Submission>>;

    /// Number of submissions matching the filters of `query`, ignoring paging.
    async fn count(&self, query: &SubmissionQuery) -> Result<i64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with a constraint violation when the username or email is taken.
    async fn create(&self, user: &NewUser) -> Result<User>;

    async fn find_by_id(&self, id: Uuid) -> Result<User>;

    async fn find_by_username(&self, username: &str) -> Result<User>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<()>;

    /// Session for `token` that has not expired at `now`.
    async fn find_active(&self, token: &str, now: DateTime<Utc>) -> Result<Session>;

    async fn delete(&self, token: &str) -> Result<()>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
