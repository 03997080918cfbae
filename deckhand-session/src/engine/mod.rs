//! Playback engine seam
//!
//! The session never decodes audio itself. Each loaded track owns one
//! engine instance built by an [`EngineFactory`]; the engine reports its
//! lifecycle through an [`EngineNotifier`] that is already tagged with the
//! owning track, so notifications can be routed (or dropped) without the
//! engine knowing anything about the session.
//!
//! Notifications travel over an unbounded channel: engines may emit from
//! any context and must never block on the session loop.

pub mod simulated;

use deckhand_common::TrackId;
use tokio::sync::mpsc;
use tracing::trace;

pub use simulated::{SimulatedEngine, SimulatedEngineFactory};

/// Decode format expectation passed to every engine
pub const FORMAT_HINT: &str = "mp3";

/// Native engine lifecycle notifications
///
/// Fixed set; an engine emits each exactly once per underlying transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineNotification {
    Load,
    LoadError,
    Play,
    End,
    Pause,
    Stop,
    Seek,
}

/// Notification as delivered to the session loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedNotification {
    /// Track the emitting engine belongs to
    pub id: TrackId,
    /// Load generation of the emitting handle
    pub generation: u64,
    pub kind: EngineNotification,
}

/// Receiving half drained by the session loop
pub type NotificationReceiver = mpsc::UnboundedReceiver<TaggedNotification>;

/// Sending half shared by all handles of one session
pub type NotificationSender = mpsc::UnboundedSender<TaggedNotification>;

/// Per-engine notification sender, tagged with its track
#[derive(Debug, Clone)]
pub struct EngineNotifier {
    id: TrackId,
    generation: u64,
    tx: NotificationSender,
}

impl EngineNotifier {
    pub fn new(id: TrackId, generation: u64, tx: NotificationSender) -> Self {
        Self { id, generation, tx }
    }

    /// Report a lifecycle transition
    ///
    /// Never blocks. If the session loop is gone the notification is dropped.
    pub fn notify(&self, kind: EngineNotification) {
        let tagged = TaggedNotification {
            id: self.id.clone(),
            generation: self.generation,
            kind,
        };
        if self.tx.send(tagged).is_err() {
            trace!("Session gone, dropping {:?} for track {}", kind, self.id);
        }
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Source description handed to the factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSource {
    pub url: String,
    pub format: &'static str,
}

impl EngineSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: FORMAT_HINT,
        }
    }
}

/// One engine instance bound to one source
///
/// Construction or decode failures are reported as
/// [`EngineNotification::LoadError`], never as a returned error.
pub trait PlaybackEngine: Send {
    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Release engine resources
    fn unload(&mut self);

    /// Whether the engine is currently playing
    fn is_playing(&self) -> bool;

    /// Playback position in seconds (meaningful only while playing)
    fn position(&self) -> f64;
}

/// Builds engine instances
///
/// Engines are created without autoplay and must emit `Load` or
/// `LoadError` once the source has been prepared.
pub trait EngineFactory: Send + Sync {
    fn create(&self, source: EngineSource, notifier: EngineNotifier) -> Box<dyn PlaybackEngine>;
}
