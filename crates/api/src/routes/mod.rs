//! Route handlers for the chat server.

pub mod chat;
pub mod health;
pub mod home;
pub mod reset;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(home::index))
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/chat", post(chat::chat))
        .route("/reset", post(reset::reset))
        .layer(CorsLayer::permissive())
}
