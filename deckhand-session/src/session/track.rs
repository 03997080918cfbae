//! Track handle: one track ID bound to one engine instance

use deckhand_common::TrackId;
use tracing::debug;

use crate::engine::{EngineFactory, EngineNotifier, EngineSource, NotificationSender, PlaybackEngine};

/// One loaded track
///
/// Owned exclusively by the session manager. `unload` consumes the handle,
/// so an engine can never be released twice.
pub struct TrackHandle {
    id: TrackId,
    source: String,
    generation: u64,
    engine: Box<dyn PlaybackEngine>,
}

impl TrackHandle {
    /// Build an engine for `url` and wire its notifications to `tx`
    ///
    /// Does not start playback. Load failures arrive later as a
    /// `LoadError` notification; the handle is valid either way.
    pub fn create(
        id: TrackId,
        url: &str,
        generation: u64,
        factory: &dyn EngineFactory,
        tx: &NotificationSender,
    ) -> Self {
        let notifier = EngineNotifier::new(id.clone(), generation, tx.clone());
        let engine = factory.create(EngineSource::new(url), notifier);
        debug!("Created handle for track {} (generation {}): {}", id, generation, url);

        Self {
            id,
            source: url.to_string(),
            generation,
            engine,
        }
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start or resume playback (no double-play guard)
    pub fn play(&mut self) {
        self.engine.play();
    }

    /// Pause if playing
    pub fn pause(&mut self) {
        if self.engine.is_playing() {
            self.engine.pause();
        }
    }

    /// Release the engine
    pub fn unload(mut self) {
        debug!("Releasing engine for track {} (generation {})", self.id, self.generation);
        self.engine.unload();
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    /// Current position in seconds
    pub fn seek_position(&self) -> f64 {
        self.engine.position()
    }
}

impl std::fmt::Debug for TrackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackHandle")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("generation", &self.generation)
            .field("playing", &self.engine.is_playing())
            .finish()
    }
}
