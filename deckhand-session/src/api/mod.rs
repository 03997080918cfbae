//! HTTP surface for the session service
//!
//! Exposes the command surface as REST endpoints and the event sink as a
//! Server-Sent Events stream.

pub mod handlers;
pub mod sse;

use axum::{
    routing::{get, post},
    Router,
};
use deckhand_common::EventBus;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::session::SessionHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Command surface of the running session
    pub session: SessionHandle,
    /// Event bus the session emits into
    pub events: EventBus,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health))

        // Session state and commands
        .route("/session", get(handlers::get_session))
        .route("/session/play", post(handlers::play))
        .route("/session/play/:id", post(handlers::play_id))
        .route("/session/load", post(handlers::load))
        .route("/session/unload/:id", post(handlers::unload))
        .route("/session/pause", post(handlers::pause))
        .route("/session/reset", post(handlers::reset))
        .route("/session/command", post(handlers::command))

        // SSE event stream
        .route("/events", get(sse::event_stream))

        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}
