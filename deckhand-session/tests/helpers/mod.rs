//! Shared test helpers for deckhand-session integration tests
//!
//! Provides a scriptable engine that records every call made to it and a
//! sink that records every event the session emits.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use deckhand_common::config::{MissingTrackPolicy, SessionSettings};
use deckhand_common::{EventSink, PlaybackEvent, TrackId};
use deckhand_session::engine::{
    EngineFactory, EngineNotification, EngineNotifier, EngineSource, PlaybackEngine,
};
use deckhand_session::{SessionHandle, SessionService};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// URLs containing this marker fail to load
pub const BAD_URL_MARKER: &str = "bad";

/// Engine call as seen by the factory
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Create(TrackId, String),
    Play(TrackId),
    Pause(TrackId),
    Unload(TrackId),
}

/// Factory for [`MockEngine`] that records calls across all engines
#[derive(Default)]
pub struct MockEngineFactory {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    notifiers: Mutex<HashMap<TrackId, EngineNotifier>>,
}

impl MockEngineFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Notifier of the most recent engine built for `id`
    ///
    /// Lets a test inject notifications after the session released the engine.
    pub fn notifier(&self, id: impl Into<TrackId>) -> EngineNotifier {
        let id = id.into();
        self.notifiers
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| panic!("no engine was created for {}", id))
    }
}

impl EngineFactory for MockEngineFactory {
    fn create(&self, source: EngineSource, notifier: EngineNotifier) -> Box<dyn PlaybackEngine> {
        let id = notifier.id().clone();
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::Create(id.clone(), source.url.clone()));
        self.notifiers
            .lock()
            .unwrap()
            .insert(id.clone(), notifier.clone());

        let loaded = !source.url.contains(BAD_URL_MARKER);
        notifier.notify(if loaded {
            EngineNotification::Load
        } else {
            EngineNotification::LoadError
        });

        Box::new(MockEngine {
            id,
            notifier,
            calls: Arc::clone(&self.calls),
            loaded,
            started: None,
            offset: 0.0,
        })
    }
}

/// Engine whose position follows the (possibly paused) tokio clock
pub struct MockEngine {
    id: TrackId,
    notifier: EngineNotifier,
    calls: Arc<Mutex<Vec<EngineCall>>>,
    loaded: bool,
    started: Option<Instant>,
    offset: f64,
}

impl PlaybackEngine for MockEngine {
    fn play(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Play(self.id.clone()));
        if self.loaded && self.started.is_none() {
            self.started = Some(Instant::now());
            self.notifier.notify(EngineNotification::Play);
        }
    }

    fn pause(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Pause(self.id.clone()));
        if let Some(started) = self.started.take() {
            self.offset += started.elapsed().as_secs_f64();
            self.notifier.notify(EngineNotification::Pause);
        }
    }

    fn unload(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Unload(self.id.clone()));
        if self.started.take().is_some() {
            self.notifier.notify(EngineNotification::Stop);
        }
    }

    fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    fn position(&self) -> f64 {
        match self.started {
            Some(started) => self.offset + started.elapsed().as_secs_f64(),
            None => self.offset,
        }
    }
}

/// Sink that keeps every event in emission order
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<PlaybackEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlaybackEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events tagged with `id`
    pub fn events_for(&self, id: impl Into<TrackId>) -> Vec<PlaybackEvent> {
        let id = id.into();
        self.events()
            .into_iter()
            .filter(|event| event.id() == Some(&id))
            .collect()
    }

    /// `time` of every seek event, in order
    pub fn seek_times(&self) -> Vec<f64> {
        self.events()
            .iter()
            .filter_map(|event| match event {
                PlaybackEvent::Seek { time, .. } => Some(*time),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventSink for RecordingSink {
    fn send(&self, event: PlaybackEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Running session wired to a mock engine and a recording sink
pub struct TestSession {
    pub handle: SessionHandle,
    pub factory: Arc<MockEngineFactory>,
    pub sink: RecordingSink,
    pub task: JoinHandle<()>,
}

impl TestSession {
    pub fn start() -> Self {
        Self::with_policy(MissingTrackPolicy::Lenient)
    }

    pub fn with_policy(policy: MissingTrackPolicy) -> Self {
        let settings = SessionSettings {
            missing_track_policy: policy,
            ..SessionSettings::default()
        };
        let factory = MockEngineFactory::new();
        let sink = RecordingSink::new();

        let (service, handle) =
            SessionService::new(factory.clone(), Arc::new(sink.clone()), &settings);
        let task = service.spawn();

        Self {
            handle,
            factory,
            sink,
            task,
        }
    }

    /// Wait until every queued command and its engine notifications are applied
    pub async fn settle(&self) {
        self.handle
            .snapshot()
            .await
            .expect("session should be running");
    }
}
