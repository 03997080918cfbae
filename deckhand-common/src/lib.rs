//! # Deckhand Common Library
//!
//! Shared code for the Deckhand session service and its clients:
//! - Wire types (track IDs, playback events, commands)
//! - EventBus and the event sink abstraction
//! - Configuration loading
//! - Error types

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{Command, EventBus, EventSink, PlaybackEvent, TrackId};
