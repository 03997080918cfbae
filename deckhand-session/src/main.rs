//! Deckhand session service - Main entry point
//!
//! Runs one session behind an HTTP command surface with an SSE event
//! stream. Playback uses the simulated engine; a real audio backend plugs
//! in through `deckhand_session::engine::EngineFactory`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use deckhand_common::config::{self, MissingTrackPolicy, TomlConfig};
use deckhand_common::EventBus;
use deckhand_session::api::{self, AppState};
use deckhand_session::engine::SimulatedEngineFactory;
use deckhand_session::{logging, SessionService};
use tokio::signal;
use tracing::info;

/// Command-line arguments for deckhand-session
#[derive(Parser, Debug)]
#[command(name = "deckhand-session")]
#[command(about = "Multi-track audio session manager")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "DECKHAND_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "DECKHAND_PORT")]
    port: Option<u16>,

    /// Report pause/unload of unknown tracks as errors
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing before anything logs
    let log_level = logging::init();

    // Parse command-line arguments
    let args = Args::parse();

    let mut config = config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    apply_overrides(&args, &mut config);

    log_level
        .set_level(&config.logging.level)
        .context("Failed to apply log level")?;

    info!("Starting Deckhand session service on port {}", config.port);
    info!(
        "Poll interval: {}ms, missing track policy: {:?}",
        config.session.poll_interval_ms, config.session.missing_track_policy
    );

    // Event bus is the session's sink; SSE clients subscribe to it
    let events = EventBus::new(config.session.event_capacity);
    info!("Event bus capacity: {}", events.capacity());

    let (service, session) = SessionService::new(
        Arc::new(SimulatedEngineFactory),
        Arc::new(events.clone()),
        &config.session,
    );
    let service_task = service.spawn();
    info!("Session service initialized");

    let app = api::create_router(AppState {
        session: session.clone(),
        events,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Release all tracks before exiting
    session.shutdown().ok();
    service_task.await.context("Session service task failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Command-line values take priority over the config file
fn apply_overrides(args: &Args, config: &mut TomlConfig) {
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.strict {
        config.session.missing_track_policy = MissingTrackPolicy::Strict;
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
