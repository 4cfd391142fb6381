use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use storage::{
    Database,
    models::{Criterion, RubricStore, Role},
    repository::{PgSessionRepository, PgUserRepository, SessionRepository},
    services::accounts,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jumper-admin")]
#[command(about = "Jumper administration tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Change the role of an existing account
    GrantRole {
        username: String,

        /// artist, mentor or admin
        role: Role,
    },
    /// Load a rubric file and print the weights it defines
    CheckRubric {
        #[arg(env = "RUBRIC_PATH")]
        path: Option<PathBuf>,
    },
    /// Delete sessions that have expired
    PurgeSessions,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("jumper_admin={},storage={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::GrantRole { username, role } => {
            let db = connect(cli.database_url.as_deref()).await?;
            handle_grant_role(&db, &username, role).await?;
        }
        Commands::CheckRubric { path } => {
            handle_check_rubric(path)?;
        }
        Commands::PurgeSessions => {
            let db = connect(cli.database_url.as_deref()).await?;
            handle_purge_sessions(&db).await?;
        }
    }

    Ok(())
}

async fn connect(database_url: Option<&str>) -> Result<Database> {
    let database_url = database_url.context("DATABASE_URL is required for this command")?;

    let db = Database::new(database_url)
        .await
        .context("Failed to connect to database")?;
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    Ok(db)
}

async fn handle_grant_role(db: &Database, username: &str, role: Role) -> Result<()> {
    let users = PgUserRepository::new(db.pool());
    let user = accounts::grant_role(&users, username, role)
        .await
        .with_context(|| format!("Failed to grant role to '{}'", username))?;

    println!("{} is now {}", user.username, user.role().as_str());

    Ok(())
}

fn handle_check_rubric(path: Option<PathBuf>) -> Result<()> {
    let rubric = RubricStore::load_or_bundled(path.as_deref()).with_context(|| match path {
        Some(ref path) => format!("Invalid rubric at {}", path.display()),
        None => "Invalid bundled rubric".to_string(),
    })?;

    println!("Default genre: {}", rubric.default_genre());
    for (genre, weights) in rubric.genres() {
        let listed: Vec<String> = Criterion::ALL
            .iter()
            .map(|c| format!("{}={}", c.as_str(), weights.weight(*c)))
            .collect();
        println!("  {:<16} {} (sum {:.2})", genre, listed.join(" "), weights.total());
    }

    Ok(())
}

async fn handle_purge_sessions(db: &Database) -> Result<()> {
    let sessions = PgSessionRepository::new(db.pool());
    let removed = sessions
        .delete_expired(Utc::now())
        .await
        .context("Failed to delete expired sessions")?;

    tracing::info!(removed, "Expired sessions purged");
    println!("Removed {} expired session(s)", removed);

    Ok(())
}
