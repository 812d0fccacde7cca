//! # toolgraph-server
//!
//! Axum-based REST API in front of a shared [`toolgraph_core::Agent`].
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | Welcome message |
//! | `GET /health` | Version, provider reachability, tool count |
//! | `POST /api/chat` | Run one query through the agent |
//! | `GET /api/tools` | Registered tool schemas |
//!
//! `POST /chat` and `GET /tools` serve the same handlers for older clients.

pub mod config;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::ServerConfig;
pub use state::AppState;

use crate::handlers::{chat_handler, health_check, list_tools, root};

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/chat", post(chat_handler))
        .route("/api/tools", get(list_tools))
        .route("/chat", post(chat_handler))
        .route("/tools", get(list_tools))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
