use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yeet_server::{config::Settings, db::Database, routes, state::AppState};

#[derive(Parser, Debug)]
#[command(name = "yeet-server")]
#[command(about = "Backend API server for the Yeet social platform", long_about = None)]
struct Args {
    /// Database file path, overriding settings (":memory:" for a throwaway database)
    #[arg(short, long, env = "YEET_DATABASE")]
    database: Option<String>,

    /// Seed demo users, posts and follows on start-up
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yeet_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new().context("Failed to load settings")?;
    if settings.auth.uses_dev_secret() {
        tracing::warn!("JWT_SECRET is not set; using the built-in development secret");
    }

    let db_path = args.database.unwrap_or_else(|| settings.database.path.clone());
    let db = Database::new(&db_path).context("Failed to create database")?;
    db.initialize().context("Failed to initialize database schema")?;
    tracing::info!("Database initialized at {}", db_path);

    if args.seed {
        db.seed_test_data().context("Failed to seed test data")?;
        tracing::info!("Test data seeded successfully");
    }

    let state = AppState::from_settings(db, &settings);
    let app = routes::router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Failed to parse server address")?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
