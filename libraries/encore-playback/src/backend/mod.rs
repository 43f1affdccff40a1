//! Playback backends
//!
//! One [`PlaybackBackend`] per media kind. The orchestrator talks to
//! whichever backend the current track needs through [`Backends`], which
//! guarantees at most one platform resource is live at a time.
//!
//! Backends never block. Commands issued before a backend is ready are
//! recorded in [`DeferredCommands`] (latest intent wins) and handed back
//! exactly once when the backend reports ready.

pub mod embedded;
pub mod native;
pub mod script;

pub use embedded::EmbeddedVideoBackend;
pub use native::NativeAudioBackend;
pub use script::{ScriptRegistry, ScriptStatus};

use crate::error::Result;
use crate::types::ResourceId;
use crate::volume::Volume;
use encore_core::{MediaKind, Track};
use std::time::Duration;

/// Notification from a platform resource
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// Resource can accept transport commands
    Ready {
        /// Duration known at this point, in seconds
        duration: Option<f64>,
    },

    /// Duration became known or changed
    DurationChanged(f64),

    /// The resource started or stopped playing on its own
    PlayingChanged(bool),

    /// Playback reached the end of the media
    Ended,

    /// The resource failed
    Error(String),
}

/// How a track was attached to a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// The live resource already plays this media
    Reused,

    /// The live resource was pointed at new media
    Retargeted,

    /// A fresh resource was created
    Created,

    /// Creation is underway; call [`PlaybackBackend::poll_init`] after the delay
    Pending {
        /// Delay before the first initialization check
        retry_in: Duration,
    },
}

/// Result of [`PlaybackBackend::prepare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    /// Id that the resource's events will carry
    pub resource: ResourceId,

    /// What happened
    pub binding: Binding,
}

/// Commands recorded while a backend isn't ready
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeferredCommands {
    playing: Option<bool>,
    seek: Option<f64>,
    volume: Option<Volume>,
}

impl DeferredCommands {
    /// Record a play (`true`) or pause (`false`) intent
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = Some(playing);
    }

    /// Record a seek target
    pub fn set_seek(&mut self, seconds: f64) {
        self.seek = Some(seconds);
    }

    /// Record a volume
    pub fn set_volume(&mut self, volume: Volume) {
        self.volume = Some(volume);
    }

    /// Pending play/pause intent
    pub fn playing(&self) -> Option<bool> {
        self.playing
    }

    /// Pending seek target
    pub fn seek(&self) -> Option<f64> {
        self.seek
    }

    /// Pending volume
    pub fn volume(&self) -> Option<Volume> {
        self.volume
    }

    /// Forget everything tied to the previous media, keeping the volume
    pub fn retarget(&mut self) {
        self.playing = None;
        self.seek = None;
    }

    /// Take all pending commands, leaving nothing behind
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.playing.is_none() && self.seek.is_none() && self.volume.is_none()
    }
}

/// A source of playback for one media kind
///
/// Transport commands on a backend that isn't ready are deferred, not
/// dropped. Time and duration queries on a backend without a ready resource
/// report zero and unknown.
pub trait PlaybackBackend {
    /// Media kind this backend plays
    fn kind(&self) -> MediaKind;

    /// Attach a track, reusing or retargeting the live resource when possible
    ///
    /// `resource` is the id to use if a new resource is created.
    fn prepare(&mut self, resource: ResourceId, track: &Track, continue_playing: bool)
        -> Result<Bound>;

    /// Continue a pending initialization
    ///
    /// Returns the delay before the next check, or `None` when
    /// initialization finished or gave up.
    fn poll_init(&mut self) -> Option<Duration> {
        None
    }

    /// The resource reported ready
    ///
    /// Applies deferred seek and volume, and returns the deferred play/pause
    /// intent for the caller to replay.
    fn on_ready(&mut self) -> Option<bool>;

    /// Whether transport commands take effect immediately
    fn is_ready(&self) -> bool;

    /// Id of the live resource
    fn resource(&self) -> Option<ResourceId>;

    /// Start playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    /// Jump to a position in seconds
    fn seek(&mut self, seconds: f64);

    /// Set volume
    fn set_volume(&mut self, volume: Volume);

    /// Position in seconds
    fn current_time(&self) -> f64;

    /// Duration in seconds, once known
    fn duration(&self) -> Option<f64>;

    /// Tear down the live resource
    fn release(&mut self);
}

/// The two backends, with at most one holding a live resource
pub struct Backends {
    native: NativeAudioBackend,
    embedded: EmbeddedVideoBackend,
    active: Option<MediaKind>,
}

impl Backends {
    /// Combine both backends; neither is active yet
    pub fn new(native: NativeAudioBackend, embedded: EmbeddedVideoBackend) -> Self {
        Self {
            native,
            embedded,
            active: None,
        }
    }

    /// Kind of the backend bound to the current track
    pub fn active_kind(&self) -> Option<MediaKind> {
        self.active
    }

    /// Backend bound to the current track
    pub fn active(&self) -> Option<&dyn PlaybackBackend> {
        self.active.map(|kind| self.get(kind))
    }

    /// Backend bound to the current track
    pub fn active_mut(&mut self) -> Option<&mut dyn PlaybackBackend> {
        let kind = self.active?;
        Some(self.get_mut(kind))
    }

    /// Backend for a media kind
    pub fn get(&self, kind: MediaKind) -> &dyn PlaybackBackend {
        match kind {
            MediaKind::Native => &self.native,
            MediaKind::Embedded => &self.embedded,
        }
    }

    /// Backend for a media kind
    pub fn get_mut(&mut self, kind: MediaKind) -> &mut dyn PlaybackBackend {
        match kind {
            MediaKind::Native => &mut self.native,
            MediaKind::Embedded => &mut self.embedded,
        }
    }

    /// Bind a track to the backend its URL needs
    ///
    /// Switching kinds releases the previous backend's resource before the
    /// new one is prepared.
    pub fn bind(
        &mut self,
        resource: ResourceId,
        track: &Track,
        continue_playing: bool,
    ) -> Result<Bound> {
        let kind = track.kind();
        if let Some(previous) = self.active.filter(|k| *k != kind) {
            tracing::debug!("Switching backend {:?} -> {:?}", previous, kind);
            self.get_mut(previous).release();
        }
        self.active = Some(kind);
        self.get_mut(kind).prepare(resource, track, continue_playing)
    }

    /// Release every resource and deactivate
    pub fn release_all(&mut self) {
        self.native.release();
        self.embedded.release();
        self.active = None;
    }

    /// Number of backends holding a platform resource
    pub fn live_resources(&self) -> usize {
        usize::from(self.native.resource().is_some())
            + usize::from(self.embedded.resource().is_some())
    }
}
