//! Player Events
//!
//! Event-based communication for UI synchronization. The orchestrator
//! queues events as state changes; the host drains them after each call
//! and re-renders.

use crate::types::PlaybackState;
use crate::volume::Volume;
use encore_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// Current track changed
    TrackChanged {
        /// Index of the new track
        index: usize,
        /// ID of the new track
        track_id: TrackId,
        /// ID of the previous track
        previous_track_id: Option<TrackId>,
    },

    /// Position or duration changed
    PositionUpdate {
        /// Position in seconds
        current_time: f64,
        /// Duration in seconds, if known
        duration: Option<f64>,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume
        volume: Volume,
    },

    /// Panel shown or hidden
    VisibilityChanged {
        /// Whether the panel is shown
        visible: bool,
    },

    /// Swipe offset changed; re-render the panel transform
    SwipeChanged {
        /// Downward offset in pixels
        offset: f64,
    },

    /// A platform resource reported an error
    Error {
        /// Error message
        message: String,
    },
}
