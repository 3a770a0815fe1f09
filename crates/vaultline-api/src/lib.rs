//! vaultline-api
//!
//! HTTP surface of the chat proxy: the streaming chat endpoint, the
//! diagnostic probe, and the liveness check.

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod stream;

use state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(routes::chat::chat))
        .route("/api/debug", get(routes::debug::debug_probe))
        .route("/api/test", get(routes::liveness::api_test))
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
