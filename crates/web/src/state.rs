use std::sync::Arc;

use chrono::Duration;
use storage::{Database, models::RubricStore};

use crate::media::MediaHost;

/// Shared by every handler. The rubric is loaded once at startup and never
/// changes afterwards.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub rubric: Arc<RubricStore>,
    pub media: Arc<dyn MediaHost>,
    pub session_ttl: Duration,
    pub max_upload_bytes: usize,
}

/// State whose pool never connects; only code paths that stay off the
/// database can be exercised with it.
#[cfg(test)]
pub fn test_state(max_upload_bytes: usize) -> AppState {
    use sqlx::postgres::PgPoolOptions;

    use crate::media::DisabledMediaHost;

    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://jumper@localhost:1/jumper")
        .unwrap();

    AppState {
        db: Database::from_pool(pool),
        rubric: Arc::new(RubricStore::bundled().unwrap()),
        media: Arc::new(DisabledMediaHost),
        session_ttl: Duration::hours(24),
        max_upload_bytes,
    }
}
