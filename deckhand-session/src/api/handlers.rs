//! HTTP request handlers
//!
//! Command endpoints only queue the command: they answer `202 Accepted`
//! once the session has it, and `503` if the session has stopped. Outcomes
//! (including unknown-track diagnostics) surface through the event stream
//! and the service log.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use deckhand_common::{Command, TrackId};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::AppState;
use crate::error::Result;
use crate::session::SessionSnapshot;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    #[serde(default)]
    id: Option<TrackId>,
}

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    id: TrackId,
    url: String,
}

type CommandResponse = (StatusCode, Json<StatusResponse>);

fn command_response(name: &str, result: Result<()>) -> CommandResponse {
    match result {
        Ok(()) => {
            info!("{} command accepted", name);
            (
                StatusCode::ACCEPTED,
                Json(StatusResponse {
                    status: "ok".to_string(),
                }),
            )
        }
        Err(e) => {
            error!("{} command failed: {}", name, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusResponse {
                    status: format!("error: {}", e),
                }),
            )
        }
    }
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "deckhand-session".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Session Endpoints
// ============================================================================

/// GET /session - Current track, loaded tracks, playing state
pub async fn get_session(
    State(state): State<AppState>,
) -> std::result::Result<Json<SessionSnapshot>, CommandResponse> {
    state
        .session
        .snapshot()
        .await
        .map(Json)
        .map_err(|e| command_response("snapshot", Err(e)))
}

/// POST /session/play - Resume the current track, or switch to `{"id": ...}`
///
/// An empty body plays the current track. A non-empty body must be JSON
/// (`415` otherwise) and must parse as a play request (`4xx` otherwise).
pub async fn play(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let id = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else if !is_json_content_type(&headers) {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(StatusResponse {
                status: "error: expected Content-Type: application/json".to_string(),
            }),
        )
            .into_response();
    } else {
        match Json::<PlayRequest>::from_bytes(&body) {
            Ok(Json(request)) => request.id,
            Err(rejection) => {
                error!("play request rejected: {}", rejection.body_text());
                return rejection.into_response();
            }
        }
    };

    let result = match id {
        Some(id) => state.session.play_id(id),
        None => state.session.play(),
    };
    command_response("play", result).into_response()
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// POST /session/play/:id - Switch to a track and play it
pub async fn play_id(State(state): State<AppState>, Path(id): Path<String>) -> CommandResponse {
    command_response("play", state.session.play_id(TrackId::from_path_segment(&id)))
}

/// POST /session/load - Register and prepare a track
pub async fn load(
    State(state): State<AppState>,
    Json(request): Json<LoadRequest>,
) -> CommandResponse {
    command_response("load", state.session.load(request.id, request.url))
}

/// POST /session/unload/:id - Release one track
pub async fn unload(State(state): State<AppState>, Path(id): Path<String>) -> CommandResponse {
    command_response("unload", state.session.unload(TrackId::from_path_segment(&id)))
}

/// POST /session/pause - Pause the current track
pub async fn pause(State(state): State<AppState>) -> CommandResponse {
    command_response("pause", state.session.pause())
}

/// POST /session/reset - Release all tracks
pub async fn reset(State(state): State<AppState>) -> CommandResponse {
    command_response("reset", state.session.reset())
}

/// POST /session/command - Any command in its JSON wire form
pub async fn command(
    State(state): State<AppState>,
    Json(command): Json<Command>,
) -> CommandResponse {
    let name = command.name();
    command_response(name, state.session.dispatch(command))
}
