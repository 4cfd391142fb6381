use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use storage::{
    models::User,
    repository::{PgSessionRepository, PgUserRepository},
    services::accounts,
};

use crate::error::WebError;
use crate::state::AppState;

/// User behind the session token of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| WebError::Unauthorized("Missing bearer token".to_string()))?
        .to_string();

    let users = PgUserRepository::new(state.db.pool());
    let sessions = PgSessionRepository::new(state.db.pool());
    let user = accounts::current_user(&users, &sessions, &token, Utc::now()).await?;

    tracing::debug!(user_id = %user.user_id, path = %request.uri().path(), "Authenticated request");

    request.extensions_mut().insert(CurrentUser { user, token });

    Ok(next.run(request).await)
}
