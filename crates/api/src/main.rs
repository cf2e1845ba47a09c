//! HTTP server for the sales assistant.
//!
//! Serves a chat page plus the JSON `/chat` and `/reset` endpoints backed by
//! the orchestrator.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use database::Database;
use orchestrator::Orchestrator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting sales assistant server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Fails fast without OPENAI_API_KEY / ASSISTANT_ID
    let orchestrator = Orchestrator::from_env(Arc::new(db))?;

    // Build application state and router
    let state = AppState::new(orchestrator);
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "Sales assistant server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
