//! Clock-driven stand-in engine
//!
//! Produces no audio. Tracks position with the wall clock so the session,
//! the poller and the HTTP surface can be exercised without an audio
//! backend. Accepts `http(s)://` sources unconditionally and local files
//! (plain path or `file://`) that exist; anything else fails to load.

use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{EngineFactory, EngineNotification, EngineNotifier, EngineSource, PlaybackEngine};

/// Factory for [`SimulatedEngine`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedEngineFactory;

impl EngineFactory for SimulatedEngineFactory {
    fn create(&self, source: EngineSource, notifier: EngineNotifier) -> Box<dyn PlaybackEngine> {
        Box::new(SimulatedEngine::new(source, notifier))
    }
}

/// Simulated engine instance
pub struct SimulatedEngine {
    source: EngineSource,
    notifier: EngineNotifier,
    available: bool,
    released: bool,
    playing_since: Option<Instant>,
    elapsed: Duration,
}

impl SimulatedEngine {
    pub fn new(source: EngineSource, notifier: EngineNotifier) -> Self {
        let available = source_available(&source.url);
        debug!(
            "Simulated engine for {} ({}): {}",
            source.url,
            source.format,
            if available { "ready" } else { "unavailable" }
        );

        notifier.notify(if available {
            EngineNotification::Load
        } else {
            EngineNotification::LoadError
        });

        Self {
            source,
            notifier,
            available,
            released: false,
            playing_since: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn source(&self) -> &EngineSource {
        &self.source
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn play(&mut self) {
        if !self.available || self.released || self.playing_since.is_some() {
            return;
        }
        self.playing_since = Some(Instant::now());
        self.notifier.notify(EngineNotification::Play);
    }

    fn pause(&mut self) {
        if let Some(since) = self.playing_since.take() {
            self.elapsed += since.elapsed();
            self.notifier.notify(EngineNotification::Pause);
        }
    }

    fn unload(&mut self) {
        if self.playing_since.take().is_some() {
            self.notifier.notify(EngineNotification::Stop);
        }
        self.released = true;
    }

    fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }

    fn position(&self) -> f64 {
        let running = self
            .playing_since
            .map(|since| since.elapsed())
            .unwrap_or_default();
        (self.elapsed + running).as_secs_f64()
    }
}

fn source_available(url: &str) -> bool {
    if url.starts_with("http://") || url.starts_with("https://") {
        return true;
    }
    let path = url.strip_prefix("file://").unwrap_or(url);
    !path.is_empty() && Path::new(path).is_file()
}
