//! Session manager
//!
//! Single authority over which track is current and over the lifetime of
//! every track handle. Only presence (loaded or absent) is tracked here;
//! playing/paused is always queried live from the handle.
//!
//! Invariants:
//! - At most one track is current. Switching unloads the previous current
//!   track before the new one is started.
//! - `current` may name a track that has since been unloaded; commands
//!   against it report a missing track.
//! - Engine notifications from a handle that is no longer in the map (or
//!   from an earlier load of a reused ID) are dropped.

use std::collections::HashMap;
use std::sync::Arc;

use deckhand_common::config::{MissingTrackPolicy, SessionSettings};
use deckhand_common::{Command, EventSink, PlaybackEvent, TrackId};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use super::poller::PositionPoller;
use super::track::TrackHandle;
use crate::engine::{
    EngineFactory, EngineNotification, NotificationReceiver, NotificationSender, TaggedNotification,
};
use crate::error::{Error, Result};

/// Read-only view of the session for status queries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Current track, if any (may not be loaded)
    pub current: Option<TrackId>,
    /// Loaded track IDs, sorted
    pub loaded: Vec<TrackId>,
    /// Whether the current track is playing
    pub playing: bool,
    /// Current track position in seconds, present while playing
    pub position: Option<f64>,
}

/// Owns all track handles and the current-track pointer
pub struct SessionManager {
    tracks: HashMap<TrackId, TrackHandle>,
    current: Option<TrackId>,
    next_generation: u64,
    factory: Arc<dyn EngineFactory>,
    notify_tx: NotificationSender,
    sink: Arc<dyn EventSink>,
    poller: PositionPoller,
    policy: MissingTrackPolicy,
}

impl SessionManager {
    /// Create a manager and the receiver its engines report through
    ///
    /// The caller must feed every received notification back into
    /// [`SessionManager::handle_notification`].
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        sink: Arc<dyn EventSink>,
        settings: &SessionSettings,
    ) -> (Self, NotificationReceiver) {
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let manager = Self {
            tracks: HashMap::new(),
            current: None,
            next_generation: 0,
            factory,
            notify_tx,
            sink,
            poller: PositionPoller::new(settings.poll_interval()),
            policy: settings.missing_track_policy,
        };
        (manager, notify_rx)
    }

    // ========================================
    // Commands
    // ========================================

    /// Register a track, replacing (and releasing) any handle under the same ID
    pub fn load(&mut self, id: TrackId, url: &str) {
        if self.release(&id) {
            debug!("Track {} reloaded, previous engine released", id);
        }

        self.next_generation += 1;
        let handle = TrackHandle::create(
            id.clone(),
            url,
            self.next_generation,
            self.factory.as_ref(),
            &self.notify_tx,
        );
        info!("Loaded track {}: {}", id, url);
        self.tracks.insert(id, handle);
    }

    /// Release one track
    ///
    /// Unloading the current track stops position polling but keeps it
    /// marked current.
    pub fn unload(&mut self, id: &TrackId) -> Result<()> {
        if self.release(id) {
            info!("Unloaded track {}", id);
            Ok(())
        } else {
            self.report_missing("unload", Some(id))
        }
    }

    /// Play the current track, or switch to `id` and play it
    ///
    /// A missing target is always reported and leaves the session untouched.
    pub fn play(&mut self, id: Option<TrackId>) -> Result<()> {
        if let Some(id) = id {
            if !self.tracks.contains_key(&id) {
                warn!("No player found for id: {}", id);
                return Err(Error::UnknownTrack(id));
            }
            if self.current.as_ref() != Some(&id) {
                if let Some(previous) = self.current.take() {
                    self.release(&previous);
                }
                debug!("Current track is now {}", id);
                self.current = Some(id);
            }
        }

        let Some(current) = self.current.clone() else {
            warn!("No player found: no current track");
            return Err(Error::NoCurrentTrack);
        };

        match self.tracks.get_mut(&current) {
            Some(handle) => {
                handle.play();
                // Engines that refuse to play (load error, released) get no timer
                if handle.is_playing() {
                    self.poller.start();
                } else {
                    debug!("Track {} did not start playing", current);
                }
                Ok(())
            }
            None => {
                warn!("No player found for id: {}", current);
                Err(Error::UnknownTrack(current))
            }
        }
    }

    /// Pause the current track
    pub fn pause(&mut self) -> Result<()> {
        let handle = match &self.current {
            Some(id) => self.tracks.get_mut(id),
            None => None,
        };

        match handle {
            Some(handle) => {
                handle.pause();
                self.poller.stop();
                Ok(())
            }
            None => {
                let current = self.current.clone();
                self.report_missing("pause", current.as_ref())
            }
        }
    }

    /// Release every track, clear the current track, emit `reset`
    pub fn reset(&mut self) {
        let ids: Vec<TrackId> = self.tracks.keys().cloned().collect();
        for id in &ids {
            self.release(id);
        }
        self.current = None;
        self.poller.stop();

        info!("Session reset ({} tracks released)", ids.len());
        self.sink.send(PlaybackEvent::Reset);
    }

    /// Apply a command from the command surface
    pub fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Play { id } => self.play(id),
            Command::Load { id, url } => {
                self.load(id, &url);
                Ok(())
            }
            Command::Unload { id } => self.unload(&id),
            Command::Pause => self.pause(),
            Command::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    /// Release everything without emitting events (service teardown)
    pub fn shutdown(&mut self) {
        for (_, handle) in self.tracks.drain() {
            handle.unload();
        }
        self.current = None;
        self.poller.stop();
    }

    // ========================================
    // Engine notifications and polling
    // ========================================

    /// Forward an engine notification to the sink
    ///
    /// Late notifications (track unloaded, or ID reloaded since) are dropped.
    pub fn handle_notification(&mut self, notification: TaggedNotification) {
        let TaggedNotification { id, generation, kind } = notification;

        let Some(handle) = self.tracks.get(&id) else {
            trace!("Dropping {:?} for unloaded track {}", kind, id);
            return;
        };
        if handle.generation() != generation {
            trace!(
                "Dropping {:?} for track {} from stale generation {} (now {})",
                kind,
                id,
                generation,
                handle.generation()
            );
            return;
        }

        let position = handle.seek_position();
        let is_current = self.current.as_ref() == Some(&id);

        if is_current {
            match kind {
                EngineNotification::Play => self.poller.start(),
                EngineNotification::Pause
                | EngineNotification::Stop
                | EngineNotification::End
                | EngineNotification::LoadError => self.poller.stop(),
                EngineNotification::Load | EngineNotification::Seek => {}
            }
        }

        let event = match kind {
            EngineNotification::Load => PlaybackEvent::Load { id },
            EngineNotification::LoadError => PlaybackEvent::LoadError { id },
            EngineNotification::Play => PlaybackEvent::Play { id },
            EngineNotification::End => PlaybackEvent::End { id },
            EngineNotification::Pause => PlaybackEvent::Pause { id },
            EngineNotification::Stop => PlaybackEvent::Stop { id },
            EngineNotification::Seek => PlaybackEvent::Seek { id, time: position },
        };
        debug!("Forwarding {} event", event.event_type());
        self.sink.send(event);
    }

    /// Wait for the next poller tick (never completes while disarmed)
    pub async fn poll_tick(&mut self) {
        self.poller.tick().await;
    }

    /// Report the current track's position if it is playing
    ///
    /// A tick that finds nothing playing disarms the poller.
    pub fn emit_position(&mut self) {
        let playing = self
            .current
            .as_ref()
            .and_then(|id| self.tracks.get(id).map(|handle| (id, handle)))
            .filter(|(_, handle)| handle.is_playing());

        match playing {
            Some((id, handle)) => {
                self.sink.send(PlaybackEvent::Seek {
                    id: id.clone(),
                    time: handle.seek_position(),
                });
            }
            None => {
                trace!("Poll tick: nothing playing");
                self.poller.stop();
            }
        }
    }

    // ========================================
    // Queries
    // ========================================

    pub fn current(&self) -> Option<&TrackId> {
        self.current.as_ref()
    }

    pub fn is_loaded(&self, id: &TrackId) -> bool {
        self.tracks.contains_key(id)
    }

    pub fn loaded_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut loaded: Vec<TrackId> = self.tracks.keys().cloned().collect();
        loaded.sort();

        let handle = self.current.as_ref().and_then(|id| self.tracks.get(id));
        let playing = handle.map(|h| h.is_playing()).unwrap_or(false);
        let position = handle
            .filter(|h| h.is_playing())
            .map(|h| h.seek_position());

        SessionSnapshot {
            current: self.current.clone(),
            loaded,
            playing,
            position,
        }
    }

    // ========================================
    // Internals
    // ========================================

    /// Remove and unload `id`; returns whether a handle existed
    fn release(&mut self, id: &TrackId) -> bool {
        match self.tracks.remove(id) {
            Some(handle) => {
                handle.unload();
                if self.current.as_ref() == Some(id) {
                    self.poller.stop();
                }
                true
            }
            None => false,
        }
    }

    fn report_missing(&self, operation: &str, id: Option<&TrackId>) -> Result<()> {
        match self.policy {
            MissingTrackPolicy::Lenient => Ok(()),
            MissingTrackPolicy::Strict => match id {
                Some(id) => {
                    warn!("{}: no player found for id: {}", operation, id);
                    Err(Error::UnknownTrack(id.clone()))
                }
                None => {
                    warn!("{}: no current track", operation);
                    Err(Error::NoCurrentTrack)
                }
            },
        }
    }
}
