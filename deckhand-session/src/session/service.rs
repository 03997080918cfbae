//! Session service run loop and command surface
//!
//! The service owns the [`SessionManager`] and processes, one at a time:
//! - engine notifications (forwarded to the sink first, so they stay
//!   ordered ahead of later commands)
//! - commands from any number of [`SessionHandle`] clones
//! - position poller ticks
//!
//! Every item runs to completion before the next is taken; nothing else
//! touches session state, so no locking is needed.

use std::sync::Arc;

use deckhand_common::config::SessionSettings;
use deckhand_common::{Command, EventSink, TrackId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::manager::{SessionManager, SessionSnapshot};
use crate::engine::{EngineFactory, NotificationReceiver};
use crate::error::{Error, Result};

enum Request {
    Command(Command),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// Single-task owner of the session
pub struct SessionService {
    manager: SessionManager,
    notifications: NotificationReceiver,
    requests: mpsc::UnboundedReceiver<Request>,
}

impl SessionService {
    /// Build a service and its first handle
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        sink: Arc<dyn EventSink>,
        settings: &SessionSettings,
    ) -> (Self, SessionHandle) {
        let (manager, notifications) = SessionManager::new(factory, sink, settings);
        let (tx, requests) = mpsc::unbounded_channel();

        let service = Self {
            manager,
            notifications,
            requests,
        };
        (service, SessionHandle { tx })
    }

    /// Spawn the run loop on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until shut down or every handle is dropped
    ///
    /// All tracks are released on exit.
    pub async fn run(self) {
        let SessionService {
            mut manager,
            mut notifications,
            mut requests,
        } = self;

        info!("Session service started");

        loop {
            tokio::select! {
                biased;

                Some(notification) = notifications.recv() => {
                    manager.handle_notification(notification);
                }

                request = requests.recv() => match request {
                    Some(Request::Command(command)) => {
                        debug!("Command: {}", command.name());
                        if let Err(e) = manager.dispatch(command) {
                            debug!("Command not applied: {}", e);
                        }
                    }
                    Some(Request::Snapshot(reply)) => {
                        let _ = reply.send(manager.snapshot());
                    }
                    Some(Request::Shutdown) | None => break,
                },

                _ = manager.poll_tick() => {
                    manager.emit_position();
                }
            }
        }

        manager.shutdown();
        info!("Session service stopped");
    }
}

/// Cloneable command surface for a running session
///
/// Commands are queued and applied in order; the methods return as soon as
/// the command is queued. Errors only mean the service is no longer running.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Request>,
}

impl SessionHandle {
    /// Queue any command
    pub fn dispatch(&self, command: Command) -> Result<()> {
        self.tx
            .send(Request::Command(command))
            .map_err(|_| Error::ServiceStopped)
    }

    /// Resume or start the current track
    pub fn play(&self) -> Result<()> {
        self.dispatch(Command::Play { id: None })
    }

    /// Switch to `id` and play it
    pub fn play_id(&self, id: impl Into<TrackId>) -> Result<()> {
        self.dispatch(Command::Play {
            id: Some(id.into()),
        })
    }

    /// Register and prepare a track
    pub fn load(&self, id: impl Into<TrackId>, url: impl Into<String>) -> Result<()> {
        self.dispatch(Command::Load {
            id: id.into(),
            url: url.into(),
        })
    }

    /// Release one track
    pub fn unload(&self, id: impl Into<TrackId>) -> Result<()> {
        self.dispatch(Command::Unload { id: id.into() })
    }

    /// Pause the current track
    pub fn pause(&self) -> Result<()> {
        self.dispatch(Command::Pause)
    }

    /// Release all tracks, clear current, emit `reset`
    pub fn reset(&self) -> Result<()> {
        self.dispatch(Command::Reset)
    }

    /// Session state after every previously queued command has been applied
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Snapshot(reply))
            .map_err(|_| Error::ServiceStopped)?;
        rx.await.map_err(|_| Error::ServiceStopped)
    }

    /// Stop the run loop (tracks are released)
    pub fn shutdown(&self) -> Result<()> {
        self.tx
            .send(Request::Shutdown)
            .map_err(|_| Error::ServiceStopped)
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}
