//! WASM-compatible player wrapper

use super::dom::{page_origin, viewport_width, CookieVolumeStore, WebAudioHost, YouTubeHost};
use super::{logging, Inbox};
use crate::backend::ScriptRegistry;
use crate::events::PlayerEvent;
use crate::gesture::{GestureEnd, TouchRegion};
use crate::orchestrator::PlayerOrchestrator;
use crate::platform::Platform;
use crate::shell::PlayerShell;
use crate::types::PlayerConfig;
use encore_core::{StaticPlaylistSource, Track};
use js_sys::Function;
use std::time::Duration;
use wasm_bindgen::prelude::*;

fn clock(now_ms: f64) -> Duration {
    if now_ms.is_finite() && now_ms > 0.0 {
        Duration::from_secs_f64(now_ms / 1000.0)
    } else {
        Duration::ZERO
    }
}

/// WASM-compatible music player
///
/// Wraps [`PlayerOrchestrator`] and [`PlayerShell`] with a JavaScript-friendly
/// API. The page calls [`tick`](Self::tick) on every animation frame.
#[wasm_bindgen]
pub struct WasmMusicPlayer {
    inner: PlayerOrchestrator,
    shell: PlayerShell,
    inbox: Inbox,

    // Event callbacks
    on_state_change: Option<Function>,
    on_track_change: Option<Function>,
    on_position: Option<Function>,
    on_volume_change: Option<Function>,
    on_visibility_change: Option<Function>,
    on_swipe: Option<Function>,
    on_error: Option<Function>,
}

#[wasm_bindgen]
impl WasmMusicPlayer {
    /// Create a player from the playlist endpoint's JSON body
    ///
    /// `config` is an optional partial [`PlayerConfig`]. An unparseable
    /// playlist leaves the player hidden.
    #[wasm_bindgen(constructor)]
    pub fn new(playlist_json: &str, config: JsValue) -> Self {
        console_error_panic_hook::set_once();
        logging::init();

        let config: PlayerConfig = if config.is_undefined() || config.is_null() {
            PlayerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).unwrap_or_else(|e| {
                tracing::warn!("Invalid player config, using defaults: {}", e);
                PlayerConfig::default()
            })
        };

        let mut source = StaticPlaylistSource::from_json(playlist_json).unwrap_or_else(|e| {
            tracing::warn!("Invalid playlist: {}", e);
            StaticPlaylistSource::default()
        });
        let mut shell = PlayerShell::new();
        let playlist = shell.load(&mut source).clone();
        shell.set_should_autoplay(config.autoplay);

        let inbox = Inbox::default();
        let scripts = ScriptRegistry::page();
        let mut platform = Platform::new(
            Box::new(WebAudioHost::new(inbox.clone())),
            Box::new(YouTubeHost::new(inbox.clone(), scripts.clone())),
            Box::new(CookieVolumeStore),
        )
        .with_scripts(scripts);
        if let Some(origin) = page_origin() {
            platform = platform.with_origin(origin);
        }

        let mut inner = PlayerOrchestrator::new(playlist, platform, config);
        if let Some(width) = viewport_width() {
            inner.set_viewport_width(width);
        }

        Self {
            inner,
            shell,
            inbox,
            on_state_change: None,
            on_track_change: None,
            on_position: None,
            on_volume_change: None,
            on_visibility_change: None,
            on_swipe: None,
            on_error: None,
        }
    }

    // ===== Lifecycle =====

    /// Attach to the page
    pub fn mount(&mut self, now_ms: f64) {
        self.inner.mount(clock(now_ms));
        self.dispatch();
    }

    /// Detach from the page and release every resource
    pub fn unmount(&mut self) {
        self.inner.unmount();
        self.inbox.borrow_mut().clear();
        self.dispatch();
    }

    /// Deliver platform notifications and run due work
    pub fn tick(&mut self, now_ms: f64) {
        let notifications: Vec<_> = self.inbox.borrow_mut().drain(..).collect();
        for (resource, event) in notifications {
            self.inner.handle_backend_event(resource, event);
        }
        self.inner.advance(clock(now_ms));
        self.dispatch();
    }

    // ===== Playback Control =====

    /// Play if paused, pause if playing
    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&mut self) {
        self.inner.toggle_play_pause();
        self.dispatch();
    }

    /// Seek to a fraction (0.0 - 1.0) of the track
    #[wasm_bindgen(js_name = seekFraction)]
    pub fn seek_fraction(&mut self, fraction: f64) {
        self.inner.seek_fraction(fraction);
        self.dispatch();
    }

    /// Set volume (0.0 - 1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, fraction: f64) {
        self.inner.set_volume(fraction);
        self.dispatch();
    }

    /// Skip to next track
    pub fn next(&mut self) {
        self.inner.next();
        self.dispatch();
    }

    /// Go to previous track
    pub fn previous(&mut self) {
        self.inner.previous();
        self.dispatch();
    }

    /// Jump to a playlist entry
    #[wasm_bindgen(js_name = selectTrack)]
    pub fn select_track(&mut self, index: usize) {
        self.inner.select_track(index);
        self.dispatch();
    }

    /// Point the player at a track chosen elsewhere on the page
    #[wasm_bindgen(js_name = setCurrentTrack)]
    pub fn set_current_track(&mut self, track: JsValue) -> Result<(), JsValue> {
        let track: Track = serde_wasm_bindgen::from_value(track)
            .map_err(|e| JsValue::from_str(&format!("Invalid track: {}", e)))?;
        self.inner.sync_external_track(&track);
        self.shell.set_current_track(Some(track));
        self.dispatch();
        Ok(())
    }

    // ===== Panel =====

    /// Show or hide the panel
    #[wasm_bindgen(js_name = togglePlayer)]
    pub fn toggle_player(&mut self) {
        self.inner.toggle_close();
        self.dispatch();
    }

    /// Show or hide the panel
    #[wasm_bindgen(js_name = setOpen)]
    pub fn set_open(&mut self, open: bool) {
        self.inner.set_visible(open);
        self.dispatch();
    }

    /// Whether the panel is shown
    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.shell.is_open()
    }

    // ===== Autoplay Prompt =====

    /// Ask the visitor whether to autoplay
    #[wasm_bindgen(js_name = showAutoplayPrompt)]
    pub fn show_autoplay_prompt(&mut self) {
        self.shell.set_show_toast(true);
    }

    /// The visitor agreed to autoplay
    #[wasm_bindgen(js_name = acceptAutoplay)]
    pub fn accept_autoplay(&mut self) {
        self.shell.accept_autoplay();
        self.inner.set_autoplay(true);
        self.dispatch();
    }

    /// The visitor declined autoplay
    #[wasm_bindgen(js_name = declineAutoplay)]
    pub fn decline_autoplay(&mut self) {
        self.shell.decline_autoplay();
        self.inner.set_autoplay(false);
    }

    /// Whether the autoplay prompt is shown
    #[wasm_bindgen(js_name = showToast)]
    pub fn show_toast(&self) -> bool {
        self.shell.show_toast()
    }

    // ===== Gestures =====

    /// Touch started; `on_handle` is true for touches on the drag handle
    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, x: f64, y: f64, on_handle: bool) -> bool {
        let region = if on_handle {
            TouchRegion::Handle
        } else {
            TouchRegion::Panel
        };
        self.inner.touch_start(region, x, y)
    }

    /// Touch moved; returns true if the page should call `preventDefault`
    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self, x: f64, y: f64, now_ms: f64) -> bool {
        let response = self.inner.touch_move(x, y, clock(now_ms));
        self.dispatch();
        response.prevent_default
    }

    /// Touch released; returns "close", "snap-back" or "inactive"
    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self) -> String {
        let end = self.inner.touch_end();
        self.dispatch();
        match end {
            GestureEnd::Close => "close",
            GestureEnd::SnapBack => "snap-back",
            GestureEnd::Inactive => "inactive",
        }
        .to_string()
    }

    /// CSS transform for the panel, if it is being dragged
    #[wasm_bindgen(js_name = swipeTransform)]
    pub fn swipe_transform(&self) -> Option<String> {
        self.inner.swipe_visual().css_transform()
    }

    /// Panel opacity for the current drag
    #[wasm_bindgen(js_name = swipeOpacity)]
    pub fn swipe_opacity(&self) -> f64 {
        self.inner.swipe_visual().opacity
    }

    /// CSS transition for the panel
    #[wasm_bindgen(js_name = swipeTransition)]
    pub fn swipe_transition(&self) -> String {
        self.inner.swipe_visual().css_transition()
    }

    /// Viewport resized
    #[wasm_bindgen(js_name = setViewportWidth)]
    pub fn set_viewport_width(&mut self, width: f64) {
        self.inner.set_viewport_width(width);
    }

    // ===== State Queries =====

    /// Full state snapshot
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.state()).map_err(JsValue::from)
    }

    /// The playlist as an array of tracks
    #[wasm_bindgen(js_name = getPlaylist)]
    pub fn get_playlist(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.playlist().tracks()).map_err(JsValue::from)
    }

    /// Whether audio is playing
    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    /// Index of the current track
    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> Option<usize> {
        self.inner.current_index()
    }

    /// Duration to display for a playlist entry
    #[wasm_bindgen(js_name = trackDuration)]
    pub fn track_duration(&self, index: usize) -> Option<f64> {
        self.inner.track_duration(index)
    }

    /// Whether the widget should render nothing
    #[wasm_bindgen(js_name = isHidden)]
    pub fn is_hidden(&self) -> bool {
        self.shell.is_hidden() || self.inner.is_hidden()
    }

    /// Whether next/previous do anything
    #[wasm_bindgen(js_name = canNavigate)]
    pub fn can_navigate(&self) -> bool {
        self.inner.can_navigate()
    }

    /// Whether transport controls do anything
    #[wasm_bindgen(js_name = controlsEnabled)]
    pub fn controls_enabled(&self) -> bool {
        self.inner.controls_enabled()
    }

    /// Cover image for the launcher button
    #[wasm_bindgen(js_name = displayCover)]
    pub fn display_cover(&self) -> Option<String> {
        self.shell.display_cover().map(str::to_string)
    }

    /// Format seconds as `M:SS`
    #[wasm_bindgen(js_name = formatTime)]
    pub fn format_time(seconds: f64) -> String {
        encore_core::format_time(seconds)
    }

    // ===== Event Callbacks =====

    /// Set callback for playback state changes
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&mut self, callback: Function) {
        self.on_state_change = Some(callback);
    }

    /// Set callback for track changes
    #[wasm_bindgen(js_name = onTrackChange)]
    pub fn on_track_change(&mut self, callback: Function) {
        self.on_track_change = Some(callback);
    }

    /// Set callback for position updates
    #[wasm_bindgen(js_name = onPosition)]
    pub fn on_position(&mut self, callback: Function) {
        self.on_position = Some(callback);
    }

    /// Set callback for volume changes
    #[wasm_bindgen(js_name = onVolumeChange)]
    pub fn on_volume_change(&mut self, callback: Function) {
        self.on_volume_change = Some(callback);
    }

    /// Set callback for panel visibility changes
    #[wasm_bindgen(js_name = onVisibilityChange)]
    pub fn on_visibility_change(&mut self, callback: Function) {
        self.on_visibility_change = Some(callback);
    }

    /// Set callback for swipe offset changes
    #[wasm_bindgen(js_name = onSwipe)]
    pub fn on_swipe(&mut self, callback: Function) {
        self.on_swipe = Some(callback);
    }

    /// Set callback for errors
    #[wasm_bindgen(js_name = onError)]
    pub fn on_error(&mut self, callback: Function) {
        self.on_error = Some(callback);
    }

    // ===== Internal Helpers =====

    fn dispatch(&mut self) {
        for event in self.inner.drain_events() {
            self.shell.apply_event(&event);
            self.emit(&event);
        }
    }

    fn emit(&self, event: &PlayerEvent) {
        let callback = match event {
            PlayerEvent::StateChanged { .. } => &self.on_state_change,
            PlayerEvent::TrackChanged { .. } => &self.on_track_change,
            PlayerEvent::PositionUpdate { .. } => &self.on_position,
            PlayerEvent::VolumeChanged { .. } => &self.on_volume_change,
            PlayerEvent::VisibilityChanged { .. } => &self.on_visibility_change,
            PlayerEvent::SwipeChanged { .. } => &self.on_swipe,
            PlayerEvent::Error { .. } => &self.on_error,
        };
        let Some(callback) = callback else {
            return;
        };
        match serde_wasm_bindgen::to_value(event) {
            Ok(payload) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
                    tracing::warn!("Event callback threw: {:?}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize {:?}: {}", event, e),
        }
    }
}
