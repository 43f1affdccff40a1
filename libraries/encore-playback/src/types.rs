//! Core types for playback management

use crate::gesture::GestureConfig;
use crate::volume::Volume;
use encore_core::MediaKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifies one platform resource (audio element or embedded widget)
///
/// Platform callbacks are tagged with the id of the resource that produced
/// them; events carrying an id that is no longer bound are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Create a resource id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing requested yet, or a track was bound without resuming
    Idle,

    /// Play was requested but the backend isn't ready yet
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Current track reached its end
    Ended,
}

impl PlaybackState {
    /// Whether playback is running or about to run
    pub fn wants_playing(self) -> bool {
        matches!(self, Self::Playing | Self::Loading)
    }
}

/// Timing and persistence configuration for the player
///
/// Times are stored in milliseconds so the config round-trips cleanly
/// through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Delay before the first embedded-widget initialization attempt
    pub init_delay_ms: u32,

    /// Interval between widget initialization checks
    pub embed_retry_interval_ms: u32,

    /// Maximum checks while waiting for the attachment point
    pub embed_max_attempts: u32,

    /// Maximum checks while waiting for the widget script
    pub script_max_attempts: u32,

    /// Interval between resume-after-change readiness checks
    pub resume_retry_interval_ms: u32,

    /// Maximum resume-after-change readiness checks
    pub resume_max_attempts: u32,

    /// Delay before autoplay fires once a track is bound
    pub autoplay_settle_ms: u32,

    /// Interval at which position and duration are sampled
    pub time_sync_interval_ms: u32,

    /// Key of the persisted volume value
    pub volume_key: String,

    /// Lifetime of the persisted volume value in days
    pub volume_max_age_days: u32,

    /// Start playing automatically after mount
    pub autoplay: bool,

    /// Embedded widget player variables
    pub widget: WidgetOptions,

    /// Swipe-to-dismiss tuning
    pub gesture: GestureConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            init_delay_ms: 100,
            embed_retry_interval_ms: 200,
            embed_max_attempts: 10,
            script_max_attempts: 50,
            resume_retry_interval_ms: 200,
            resume_max_attempts: 5,
            autoplay_settle_ms: 500,
            time_sync_interval_ms: 100,
            volume_key: "musicPlayerVolume".to_string(),
            volume_max_age_days: 365,
            autoplay: false,
            widget: WidgetOptions::default(),
            gesture: GestureConfig::default(),
        }
    }
}

impl PlayerConfig {
    pub(crate) fn init_delay(&self) -> Duration {
        ms(self.init_delay_ms)
    }

    pub(crate) fn embed_retry_interval(&self) -> Duration {
        ms(self.embed_retry_interval_ms)
    }

    pub(crate) fn resume_retry_interval(&self) -> Duration {
        ms(self.resume_retry_interval_ms)
    }

    pub(crate) fn autoplay_settle(&self) -> Duration {
        ms(self.autoplay_settle_ms)
    }

    pub(crate) fn time_sync_interval(&self) -> Duration {
        ms(self.time_sync_interval_ms.max(1))
    }

    pub(crate) fn volume_max_age(&self) -> Duration {
        Duration::from_secs(u64::from(self.volume_max_age_days) * 24 * 60 * 60)
    }
}

fn ms(value: u32) -> Duration {
    Duration::from_millis(u64::from(value))
}

/// Player variables passed to the embedded widget on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetOptions {
    /// Start playing as soon as the widget loads
    pub autoplay: bool,
    /// Show the widget's own controls
    pub controls: bool,
    /// Enable the widget's keyboard shortcuts
    pub keyboard: bool,
    /// Allow the fullscreen button
    pub fullscreen: bool,
    /// Show video annotations
    pub annotations: bool,
    /// Play inline on mobile instead of fullscreen
    pub plays_inline: bool,
    /// Show related videos when playback ends
    pub related: bool,
    /// Reduce platform branding
    pub modest_branding: bool,
    /// Page origin, sent so the widget accepts API messages
    pub origin: Option<String>,
    /// Hidden widget width
    pub width: u32,
    /// Hidden widget height
    pub height: u32,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            autoplay: false,
            controls: false,
            keyboard: false,
            fullscreen: false,
            annotations: false,
            plays_inline: true,
            related: false,
            modest_branding: true,
            origin: None,
            width: 1,
            height: 1,
        }
    }
}

impl WidgetOptions {
    /// Player variables in the widget API's wire form
    pub fn player_vars(&self) -> Vec<(&'static str, String)> {
        let flag = |on: bool| if on { "1" } else { "0" }.to_string();
        let mut vars = vec![
            ("autoplay", flag(self.autoplay)),
            ("controls", flag(self.controls)),
            ("disablekb", flag(!self.keyboard)),
            ("enablejsapi", "1".to_string()),
            ("fs", flag(self.fullscreen)),
            ("iv_load_policy", if self.annotations { "1" } else { "3" }.to_string()),
            ("modestbranding", flag(self.modest_branding)),
            ("playsinline", flag(self.plays_inline)),
            ("rel", flag(self.related)),
        ];
        if let Some(origin) = &self.origin {
            vars.push(("origin", origin.clone()));
        }
        vars
    }
}

/// Snapshot of everything the UI renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Index of the current track, `None` for an empty playlist
    pub current_index: Option<usize>,
    /// Whether audio is audibly playing
    pub is_playing: bool,
    /// Fine-grained playback state
    pub playback: PlaybackState,
    /// Position in seconds
    pub current_time: f64,
    /// Duration in seconds, once known
    pub duration: Option<f64>,
    /// Current volume
    pub volume: Volume,
    /// Backend bound to the current track
    pub backend_kind: Option<MediaKind>,
    /// Playback should resume once the new track's backend is ready
    pub should_resume_after_change: bool,
    /// The user explicitly paused; suppresses autoplay
    pub user_paused: bool,
    /// Whether the player panel is shown
    pub visible: bool,
}
