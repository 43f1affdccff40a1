//! Encore - Playback Engine
//!
//! Media-playback engine behind the Encore blog music widget.
//!
//! This crate provides:
//! - Two playback backends behind one trait: the platform audio primitive
//!   for direct media files, and a hidden embedded video widget for hosted
//!   videos
//! - Circular playlist navigation with resume-after-change
//! - Swipe-to-dismiss gesture recognition
//! - Persisted volume
//! - Autoplay with user-pause suppression
//!
//! # Architecture
//!
//! The engine is single-threaded and never blocks or sleeps. The host page
//! feeds it three kinds of input and renders from its events:
//!
//! ```text
//!   UI commands ─┐
//!   platform     ├─> PlayerOrchestrator ──> PlayerEvent queue ──> UI
//!   callbacks   ─┤        │
//!   clock ticks ─┘        └─> PlaybackBackend (native | embedded) ──> page
//! ```
//!
//! Everything the engine does to the page goes through the traits in
//! [`platform`]; the `wasm` feature provides browser implementations.
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_core::{Playlist, Track};
//! use encore_playback::{Platform, PlayerConfig, PlayerOrchestrator};
//! use std::time::Duration;
//!
//! # fn platform() -> Platform { unimplemented!() }
//! let playlist = Playlist::new(vec![
//!     Track::new(1, "Intro", "/audio/intro.mp3"),
//!     Track::new(2, "Live set", "https://www.youtube.com/watch?v=abc123"),
//! ]);
//!
//! let mut player = PlayerOrchestrator::new(playlist, platform(), PlayerConfig::default());
//! player.mount(Duration::ZERO);
//! player.toggle_play_pause();
//!
//! // On every animation frame
//! player.advance(Duration::from_millis(16));
//! for event in player.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod events;
pub mod gesture;
pub mod navigator;
pub mod orchestrator;
pub mod platform;
pub mod poll;
pub mod scheduler;
pub mod shell;
pub mod types;
pub mod volume;

#[cfg(feature = "wasm")]
#[allow(unsafe_code)]
pub mod wasm;

#[cfg(test)]
mod fakes;

pub use backend::{
    BackendEvent, Backends, Binding, Bound, DeferredCommands, EmbeddedVideoBackend,
    NativeAudioBackend, PlaybackBackend, ScriptRegistry, ScriptStatus,
};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use gesture::{
    GestureConfig, GestureEnd, GestureRecognizer, MoveResponse, SwipeVisual, TouchRegion,
};
pub use navigator::{TrackNavigator, Transition};
pub use orchestrator::PlayerOrchestrator;
pub use platform::{
    AudioHost, EmbedHost, EmbedWidget, MediaElement, Platform, ReadyState, VolumeStore,
    WidgetState,
};
pub use poll::{BoundedPoll, PollOutcome, Probe};
pub use scheduler::{Scheduler, TaskId};
pub use shell::PlayerShell;
pub use types::{PlaybackState, PlayerConfig, PlayerState, ResourceId, WidgetOptions};
pub use volume::{MemoryVolumeStore, Volume, VolumePersistence};

#[cfg(feature = "wasm")]
pub use wasm::WasmMusicPlayer;
