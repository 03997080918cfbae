//! # Deckhand Session Library (deckhand-session)
//!
//! Multi-track audio session manager.
//!
//! **Purpose:** Own a set of loadable tracks identified by caller-supplied
//! IDs, keep at most one of them current, and turn engine lifecycle
//! notifications plus periodic position polling into a single normalized
//! stream of playback events.
//!
//! **Architecture:** One cooperative task ([`session::SessionService`])
//! owns all session state; callers talk to it through cloneable
//! [`session::SessionHandle`]s. Audio decoding and output live behind the
//! [`engine::PlaybackEngine`] trait.

pub mod api;
pub mod engine;
pub mod error;
pub mod logging;
pub mod session;

pub use error::{Error, Result};
pub use session::{SessionHandle, SessionService, SessionSnapshot};
