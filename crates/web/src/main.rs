use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use storage::{Database, models::RubricStore};

mod config;
mod error;
mod extract;
mod features;
mod media;
mod middleware;
mod openapi;
mod routes;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Jumper API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let rubric = RubricStore::load_or_bundled(config.rubric_path.as_deref())
        .context("Failed to load scoring rubric")?;
    tracing::info!(
        default_genre = rubric.default_genre(),
        genres = rubric.genres().count(),
        source = %config
            .rubric_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "bundled".to_string()),
        "Scoring rubric loaded"
    );

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let media = media::media_host_from_config(&config.media)
        .context("Failed to set up media host client")?;

    let session_ttl = Duration::try_hours(config.session_ttl_hours)
        .context("SESSION_TTL_HOURS is out of range")?;

    let state = AppState {
        db,
        rubric: Arc::new(rubric),
        media: Arc::from(media),
        session_ttl,
        max_upload_bytes: config.media.max_bytes,
    };

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, routes::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
