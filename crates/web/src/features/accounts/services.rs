use chrono::{Duration, Utc};
use sqlx::PgPool;
use storage::{
    dto::user::{LoginRequest, RegisterRequest},
    error::ServiceResult,
    models::{Session, User},
    repository::{PgSessionRepository, PgUserRepository},
    services::accounts,
};

pub async fn register(pool: &PgPool, request: &RegisterRequest) -> ServiceResult<User> {
    let users = PgUserRepository::new(pool);
    accounts::register(&users, request, Utc::now()).await
}

pub async fn login(
    pool: &PgPool,
    request: &LoginRequest,
    ttl: Duration,
) -> ServiceResult<(User, Session)> {
    let users = PgUserRepository::new(pool);
    let sessions = PgSessionRepository::new(pool);
    accounts::login(&users, &sessions, request, ttl, Utc::now()).await
}

pub async fn logout(pool: &PgPool, token: &str) -> ServiceResult<()> {
    let sessions = PgSessionRepository::new(pool);
    accounts::logout(&sessions, token).await
}
