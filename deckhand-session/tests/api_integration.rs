//! Integration tests for the Deckhand session HTTP API
//!
//! Tests the complete API surface including:
//! - Health check
//! - Session snapshot
//! - Command endpoints (REST and JSON command form)
//! - Event flow from commands to the event bus

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use deckhand_common::config::SessionSettings;
use deckhand_common::{EventBus, PlaybackEvent, TrackId};
use deckhand_session::api::{create_router, AppState};
use deckhand_session::engine::SimulatedEngineFactory;
use deckhand_session::{SessionHandle, SessionService};
use http::{Method, Request};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tower::ServiceExt;

/// Test helper to create a router backed by a running session
fn setup_test_server() -> (axum::Router, SessionHandle, EventBus) {
    let events = EventBus::new(64);
    let (service, session) = SessionService::new(
        Arc::new(SimulatedEngineFactory),
        Arc::new(events.clone()),
        &SessionSettings::default(),
    );
    service.spawn();

    let router = create_router(AppState {
        session: session.clone(),
        events: events.clone(),
    });
    (router, session, events)
}

/// Helper function to make HTTP requests to the test server
async fn make_request(
    app: &axum::Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    let mut request = Request::builder().method(method).uri(path);

    let request = match body {
        Some(json_body) => {
            request = request.header("content-type", "application/json");
            request.body(Body::from(json_body.to_string())).unwrap()
        }
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    // Extractor rejections reply with plain text
    let json_body = serde_json::from_slice(&body).ok();

    (status, json_body)
}

/// POST a raw body with an explicit (or missing) content type
async fn post_raw(app: &axum::Router, path: &str, content_type: Option<&str>, body: &str) -> StatusCode {
    let mut request = Request::builder().method(Method::POST).uri(path);
    if let Some(content_type) = content_type {
        request = request.header("content-type", content_type);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    app.clone().oneshot(request).await.unwrap().status()
}

/// Load and play `a`, with `b` loaded alongside
async fn setup_playing_a(app: &axum::Router, rx: &mut broadcast::Receiver<PlaybackEvent>) {
    for id in ["a", "b"] {
        make_request(
            app,
            Method::POST,
            "/session/load",
            Some(json!({"id": id, "url": format!("http://host/{}.mp3", id)})),
        )
        .await;
        next_event(rx).await;
    }
    make_request(app, Method::POST, "/session/play/a", None).await;
    next_event(rx).await;
}

async fn next_event(rx: &mut broadcast::Receiver<PlaybackEvent>) -> PlaybackEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("Timed out waiting for event")
        .expect("Event bus closed")
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _, _) = setup_test_server();

    let (status, body) = make_request(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.expect("Expected response body");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "deckhand-session");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_initial_session_is_empty() {
    let (app, _, _) = setup_test_server();

    let (status, body) = make_request(&app, Method::GET, "/session", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["current"], Value::Null);
    assert_eq!(body["loaded"], json!([]));
    assert_eq!(body["playing"], false);
    assert_eq!(body["position"], Value::Null);
}

#[tokio::test]
async fn test_load_and_play_flow() {
    let (app, _, events) = setup_test_server();
    let mut rx = events.subscribe();

    let (status, body) = make_request(
        &app,
        Method::POST,
        "/session/load",
        Some(json!({"id": "a", "url": "http://host/a.mp3"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body.unwrap()["status"], "ok");
    assert_eq!(
        next_event(&mut rx).await,
        PlaybackEvent::Load {
            id: TrackId::from("a")
        }
    );

    let (status, _) = make_request(&app, Method::POST, "/session/play/a", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(
        next_event(&mut rx).await,
        PlaybackEvent::Play {
            id: TrackId::from("a")
        }
    );

    let (status, body) = make_request(&app, Method::GET, "/session", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["current"], "a");
    assert_eq!(body["loaded"], json!(["a"]));
    assert_eq!(body["playing"], true);
    assert!(body["position"].is_number());

    let (status, _) = make_request(&app, Method::POST, "/session/pause", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, body) = make_request(&app, Method::GET, "/session", None).await;
    assert_eq!(body.unwrap()["playing"], false);
}

#[tokio::test]
async fn test_play_accepts_optional_body() {
    let (app, _, events) = setup_test_server();
    let mut rx = events.subscribe();

    make_request(
        &app,
        Method::POST,
        "/session/load",
        Some(json!({"id": "b", "url": "http://host/b.mp3"})),
    )
    .await;
    next_event(&mut rx).await;

    let (status, _) = make_request(
        &app,
        Method::POST,
        "/session/play",
        Some(json!({"id": "b"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(
        next_event(&mut rx).await,
        PlaybackEvent::Play {
            id: TrackId::from("b")
        }
    );

    let (_, body) = make_request(&app, Method::GET, "/session", None).await;
    assert_eq!(body.unwrap()["current"], "b");
}

#[tokio::test]
async fn test_play_body_without_json_content_type_is_rejected() {
    let (app, _, events) = setup_test_server();
    let mut rx = events.subscribe();
    setup_playing_a(&app, &mut rx).await;

    let status = post_raw(&app, "/session/play", None, r#"{"id":"b"}"#).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let status = post_raw(&app, "/session/play", Some("text/plain"), r#"{"id":"b"}"#).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let (_, body) = make_request(&app, Method::GET, "/session", None).await;
    assert_eq!(body.unwrap()["current"], "a");
}

#[tokio::test]
async fn test_play_body_with_invalid_id_is_rejected() {
    let (app, _, events) = setup_test_server();
    let mut rx = events.subscribe();
    setup_playing_a(&app, &mut rx).await;

    for body in [r#"{"id":1.5}"#, r#"{"id":"b""#, r#""b""#] {
        let status = post_raw(&app, "/session/play", Some("application/json"), body).await;
        assert!(status.is_client_error(), "{} gave {}", body, status);
    }

    let (_, body) = make_request(&app, Method::GET, "/session", None).await;
    let body = body.unwrap();
    assert_eq!(body["current"], "a");
    assert_eq!(body["loaded"], json!(["a", "b"]));
}

#[tokio::test]
async fn test_play_with_empty_body_resumes_current() {
    let (app, _, events) = setup_test_server();
    let mut rx = events.subscribe();
    setup_playing_a(&app, &mut rx).await;

    make_request(&app, Method::POST, "/session/pause", None).await;
    let status = post_raw(&app, "/session/play", Some("application/json"), "").await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, body) = make_request(&app, Method::GET, "/session", None).await;
    let body = body.unwrap();
    assert_eq!(body["current"], "a");
    assert_eq!(body["playing"], true);
}

#[tokio::test]
async fn test_numeric_ids_in_paths() {
    let (app, _, _) = setup_test_server();

    make_request(
        &app,
        Method::POST,
        "/session/load",
        Some(json!({"id": 42, "url": "http://host/42.mp3"})),
    )
    .await;
    let (_, body) = make_request(&app, Method::GET, "/session", None).await;
    assert_eq!(body.unwrap()["loaded"], json!([42]));

    let (status, _) = make_request(&app, Method::POST, "/session/unload/42", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, body) = make_request(&app, Method::GET, "/session", None).await;
    assert_eq!(body.unwrap()["loaded"], json!([]));
}

#[tokio::test]
async fn test_command_endpoint_accepts_wire_form() {
    let (app, _, events) = setup_test_server();
    let mut rx = events.subscribe();

    for command in [
        json!({"type": "load", "id": "a", "url": "http://host/a.mp3"}),
        json!({"type": "play", "id": "a"}),
        json!({"type": "reset"}),
    ] {
        let (status, _) =
            make_request(&app, Method::POST, "/session/command", Some(command)).await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    let a = TrackId::from("a");
    assert_eq!(next_event(&mut rx).await, PlaybackEvent::Load { id: a.clone() });
    assert_eq!(next_event(&mut rx).await, PlaybackEvent::Play { id: a });
    assert_eq!(next_event(&mut rx).await, PlaybackEvent::Reset);
}

#[tokio::test]
async fn test_command_endpoint_rejects_unknown_type() {
    let (app, _, _) = setup_test_server();

    let (status, _) = make_request(
        &app,
        Method::POST,
        "/session/command",
        Some(json!({"type": "rewind"})),
    )
    .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_play_unknown_track_is_accepted_and_harmless() {
    let (app, _, _) = setup_test_server();

    let (status, _) = make_request(&app, Method::POST, "/session/play/missing", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, body) = make_request(&app, Method::GET, "/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["current"], Value::Null);
}

#[tokio::test]
async fn test_event_stream_subscribes_to_bus() {
    let (app, _, events) = setup_test_server();
    assert_eq!(events.subscriber_count(), 0);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/events")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(events.subscriber_count(), 1);

    drop(response);
    assert_eq!(events.subscriber_count(), 0);
}

#[tokio::test]
async fn test_commands_after_shutdown_return_unavailable() {
    let (app, session, _) = setup_test_server();

    session.shutdown().unwrap();
    while session.is_running() {
        tokio::task::yield_now().await;
    }

    let (status, body) = make_request(&app, Method::POST, "/session/play", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.unwrap()["status"]
        .as_str()
        .unwrap()
        .starts_with("error"));

    let (status, _) = make_request(&app, Method::GET, "/session", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
