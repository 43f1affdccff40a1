//! Platform boundary
//!
//! Everything that touches the page goes through these traits: the audio
//! primitive, the embedded widget and its script, and the persisted volume.
//! Browser implementations live in the `wasm` module; tests use in-memory
//! doubles.
//!
//! Hosts deliver asynchronous notifications (ready, play, pause, ended,
//! error) back to the orchestrator as [`BackendEvent`](crate::BackendEvent)s
//! tagged with the [`ResourceId`] they were created with.

use crate::backend::script::ScriptRegistry;
use crate::error::Result;
use crate::types::{ResourceId, WidgetOptions};
use std::rc::Rc;
use std::time::Duration;
use url::Url;

/// Loading progress of a media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    /// No information about the media
    Nothing,
    /// Duration and dimensions known
    Metadata,
    /// Data for the current position only
    CurrentData,
    /// Enough data to advance a little
    FutureData,
    /// Enough data to play through
    EnoughData,
}

impl ReadyState {
    /// Map the platform's numeric ready state
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Nothing,
            1 => Self::Metadata,
            2 => Self::CurrentData,
            3 => Self::FutureData,
            _ => Self::EnoughData,
        }
    }

    /// Whether playback can start without waiting
    pub fn can_play(self) -> bool {
        self >= Self::FutureData
    }
}

/// The platform's audio primitive
pub trait MediaElement {
    /// Currently assigned source URL
    fn src(&self) -> String;

    /// Loading progress
    fn ready_state(&self) -> ReadyState;

    /// Start playback
    ///
    /// Synchronous refusals (autoplay policy) are returned as errors. Late
    /// refusals arrive as a `PlayingChanged(false)` event.
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    /// Whether the element is paused
    fn is_paused(&self) -> bool;

    /// Position in seconds
    fn current_time(&self) -> f64;

    /// Jump to a position in seconds
    fn set_current_time(&mut self, seconds: f64);

    /// Duration in seconds, NaN while unknown
    fn duration(&self) -> f64;

    /// Set volume in `[0, 1]`
    fn set_volume(&mut self, volume: f64);

    /// Stop, clear the source, and detach from the page
    fn release(&mut self);
}

/// Creates and finds audio primitives
pub trait AudioHost {
    /// Take over an element already on the page, if there is one
    ///
    /// The host re-tags the element's notifications with `resource`.
    fn adopt(&mut self, resource: ResourceId) -> Option<Box<dyn MediaElement>>;

    /// Create a new element for `url`
    fn create(&mut self, resource: ResourceId, url: &str) -> Result<Box<dyn MediaElement>>;
}

/// Widget-reported playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// Not started
    Unstarted,
    /// Reached the end
    Ended,
    /// Playing
    Playing,
    /// Paused
    Paused,
    /// Buffering
    Buffering,
    /// Video cued, not playing
    Cued,
}

impl WidgetState {
    /// Map the widget API's numeric state
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }
}

/// A live embedded video widget
pub trait EmbedWidget {
    /// Load a video and start playing it
    fn load_video_by_id(&mut self, video_id: &str) -> Result<()>;

    /// Load a video without playing it
    fn cue_video_by_id(&mut self, video_id: &str) -> Result<()>;

    /// Start playback
    fn play_video(&mut self) -> Result<()>;

    /// Pause playback
    fn pause_video(&mut self) -> Result<()>;

    /// Jump to a position in seconds
    fn seek_to(&mut self, seconds: f64) -> Result<()>;

    /// Set volume on the widget's `0..=100` scale
    fn set_volume(&mut self, percent: f64) -> Result<()>;

    /// Position in seconds
    fn current_time(&self) -> Option<f64>;

    /// Duration in seconds
    fn duration(&self) -> Option<f64>;

    /// Widget-reported state
    fn player_state(&self) -> Option<WidgetState>;

    /// Tear the widget down
    fn destroy(&mut self);
}

/// Creates embedded widgets and manages their page-level prerequisites
pub trait EmbedHost {
    /// Whether the widget API is already usable on the page
    fn script_present(&self) -> bool;

    /// Start loading the widget API script
    fn inject_script(&mut self, src: &str) -> Result<()>;

    /// Create the hidden attachment point (no-op if it exists)
    fn ensure_container(&mut self, id: &str) -> Result<()>;

    /// Whether the attachment point is in the page
    fn container_attached(&self, id: &str) -> bool;

    /// Remove the attachment point
    fn remove_container(&mut self, id: &str);

    /// Create a widget in the attachment point
    ///
    /// The widget's notifications are tagged with `resource`.
    fn create_widget(
        &mut self,
        resource: ResourceId,
        container_id: &str,
        video_id: &str,
        options: &WidgetOptions,
    ) -> Result<Box<dyn EmbedWidget>>;
}

/// Key/value store for persisted settings
pub trait VolumeStore {
    /// Read a value
    fn read(&self, key: &str) -> Option<String>;

    /// Write a value that expires after `max_age`
    fn write(&mut self, key: &str, value: &str, max_age: Duration) -> Result<()>;
}

/// Everything the orchestrator needs from the page
pub struct Platform {
    /// Audio primitive factory
    pub audio: Box<dyn AudioHost>,

    /// Embedded widget factory
    pub embed: Box<dyn EmbedHost>,

    /// Page-wide widget script state
    pub scripts: Rc<ScriptRegistry>,

    /// Persisted settings
    pub store: Box<dyn VolumeStore>,

    /// Page origin, used to resolve relative track URLs
    pub origin: Option<Url>,
}

impl Platform {
    /// Bundle platform services using the page-wide script registry
    pub fn new(
        audio: Box<dyn AudioHost>,
        embed: Box<dyn EmbedHost>,
        store: Box<dyn VolumeStore>,
    ) -> Self {
        Self {
            audio,
            embed,
            scripts: ScriptRegistry::page(),
            store,
            origin: None,
        }
    }

    /// Builder: set the page origin
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Builder: use a specific script registry
    pub fn with_scripts(mut self, scripts: Rc<ScriptRegistry>) -> Self {
        self.scripts = scripts;
        self
    }
}
