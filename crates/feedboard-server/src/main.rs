mod config;

use clap::{Parser, Subcommand};
use tracing::info;

use feedboard_api::AppStateInner;
use feedboard_db::{Database, StoreError};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "feedboard", about = "Feedback board with per-user upvotes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Delete a feedback item and all of its upvotes
    DeleteFeedback { id: i64 },
    /// Print every feedback item with its upvote count
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "feedboard=debug,feedboard_api=debug,feedboard_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let db = Database::open(&config.db_path)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, db).await,
        Command::DeleteFeedback { id } => delete_feedback(&db, id),
        Command::List => list(&db),
    }
}

async fn serve(config: Config, db: Database) -> anyhow::Result<()> {
    let app = feedboard_api::router(AppStateInner::new(db));

    let addr = config.addr()?;
    info!("Feedboard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn delete_feedback(db: &Database, id: i64) -> anyhow::Result<()> {
    match db.delete_feedback(id) {
        Ok(upvotes) => {
            println!("Deleted feedback {id} and {upvotes} upvote(s)");
            Ok(())
        }
        Err(StoreError::NotFound) => anyhow::bail!("Feedback {id} not found"),
        Err(e) => Err(e.into()),
    }
}

fn list(db: &Database) -> anyhow::Result<()> {
    for summary in db.list_feedback_for_viewer(None)? {
        let fb = &summary.feedback;
        println!(
            "#{:<5} {}  {:>4} votes  {}: {}",
            fb.id,
            fb.created_at.format(feedboard_types::models::TIMESTAMP_FORMAT),
            summary.upvote_count,
            fb.username,
            fb.content
        );
    }
    Ok(())
}
