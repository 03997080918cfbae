//! Event types for the Deckhand event system
//!
//! Provides the playback event definitions, the EventBus, and the
//! `EventSink` abstraction the session manager emits through.

// Sub-modules (supporting types)
mod command_types;
mod track_types;

pub use command_types::Command;
pub use track_types::TrackId;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Normalized playback lifecycle notification
///
/// Serialized with a `type` tag so clients receive the flat shape
/// `{"type": "seek", "id": "a", "time": 12.3}`. `reset` carries no other
/// fields; `time` is only present on `seek`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlaybackEvent {
    /// Engine finished preparing the source
    Load { id: TrackId },

    /// Engine could not construct or decode the source
    ///
    /// The track remains loaded until the caller unloads it.
    LoadError { id: TrackId },

    /// Playback started or resumed
    Play { id: TrackId },

    /// Playback reached the end of the source
    End { id: TrackId },

    /// Playback paused
    Pause { id: TrackId },

    /// Playback stopped by the engine
    Stop { id: TrackId },

    /// Playback position report (seconds)
    ///
    /// Emitted by the position poller while the current track plays, and
    /// when the engine reports a native seek.
    Seek { id: TrackId, time: f64 },

    /// Session was reset: all tracks released, no current track
    Reset,
}

impl PlaybackEvent {
    /// Event type string as used on the wire and as the SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            PlaybackEvent::Load { .. } => "load",
            PlaybackEvent::LoadError { .. } => "loaderror",
            PlaybackEvent::Play { .. } => "play",
            PlaybackEvent::End { .. } => "end",
            PlaybackEvent::Pause { .. } => "pause",
            PlaybackEvent::Stop { .. } => "stop",
            PlaybackEvent::Seek { .. } => "seek",
            PlaybackEvent::Reset => "reset",
        }
    }

    /// Track this event refers to (None for `reset`)
    pub fn id(&self) -> Option<&TrackId> {
        match self {
            PlaybackEvent::Load { id }
            | PlaybackEvent::LoadError { id }
            | PlaybackEvent::Play { id }
            | PlaybackEvent::End { id }
            | PlaybackEvent::Pause { id }
            | PlaybackEvent::Stop { id }
            | PlaybackEvent::Seek { id, .. } => Some(id),
            PlaybackEvent::Reset => None,
        }
    }

    /// Playback position carried by `seek` events
    pub fn time(&self) -> Option<f64> {
        match self {
            PlaybackEvent::Seek { time, .. } => Some(*time),
            _ => None,
        }
    }
}

// ========================================
// Event Sink
// ========================================

/// Consumer of playback events
///
/// Receives one event per call. Implementations must not block; there is no
/// acknowledgement or backpressure, and failures inside the sink are the
/// sink's own concern.
pub trait EventSink: Send + Sync {
    fn send(&self, event: PlaybackEvent);
}

impl<F> EventSink for F
where
    F: Fn(PlaybackEvent) + Send + Sync,
{
    fn send(&self, event: PlaybackEvent) {
        self(event)
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use deckhand_common::events::{EventBus, PlaybackEvent, TrackId};
/// use std::sync::Arc;
///
/// let event_bus = Arc::new(EventBus::new(256));
///
/// // Subscribe to events
/// let mut rx = event_bus.subscribe();
///
/// // Emit an event
/// event_bus.emit(PlaybackEvent::Play { id: TrackId::from("a") }).ok();
///
/// assert_eq!(rx.try_recv().unwrap().event_type(), "play");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlaybackEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlaybackEvent,
    ) -> Result<usize, broadcast::error::SendError<PlaybackEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlaybackEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl EventSink for EventBus {
    fn send(&self, event: PlaybackEvent) {
        self.emit_lossy(event);
    }
}
