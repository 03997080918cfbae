//! Command type definitions
//!
//! One command per logical action issued by the control layer. No batching.

use serde::{Deserialize, Serialize};

use super::track_types::TrackId;

/// Caller intent sent to the session service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    /// Resume the current track, or switch to `id` and play it
    Play {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<TrackId>,
    },
    /// Register and prepare a track
    Load {
        id: TrackId,
        url: String,
    },
    /// Release one track
    Unload {
        id: TrackId,
    },
    /// Pause the current track
    Pause,
    /// Release all tracks, clear current, emit `reset`
    Reset,
}

impl Command {
    /// Command name as used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Command::Play { .. } => "play",
            Command::Load { .. } => "load",
            Command::Unload { .. } => "unload",
            Command::Pause => "pause",
            Command::Reset => "reset",
        }
    }
}
