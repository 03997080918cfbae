//! Track session management
//!
//! **Module Structure:**
//! - `track.rs`: Track handle (one ID bound to one engine)
//! - `manager.rs`: Session manager (current track, handle lifetimes)
//! - `poller.rs`: Position poller (periodic `seek` reports)
//! - `service.rs`: Run loop and the cloneable command surface

mod manager;
mod poller;
mod service;
mod track;

pub use manager::{SessionManager, SessionSnapshot};
pub use poller::PositionPoller;
pub use service::{SessionHandle, SessionService};
pub use track::TrackHandle;
