//! Error types for deckhand-session
//!
//! None of these are fatal: the run loop logs a failed command and keeps
//! serving the next one.

use deckhand_common::TrackId;
use thiserror::Error;

/// Main error type for deckhand-session
#[derive(Error, Debug)]
pub enum Error {
    /// Command referenced a track with no loaded handle
    #[error("No player found for id: {0}")]
    UnknownTrack(TrackId),

    /// `play()` without an ID while no track is current
    #[error("No current track")]
    NoCurrentTrack,

    /// Session run loop has exited
    #[error("Session service stopped")]
    ServiceStopped,
}

/// Convenience Result type using deckhand-session Error
pub type Result<T> = std::result::Result<T, Error>;
