//! Page-level player state
//!
//! [`PlayerShell`] holds what lives outside the player itself: the fetched
//! playlist, the open/closed flag of the panel, the externally owned
//! "current track" pointer, and the autoplay consent prompt. The
//! orchestrator follows the shell; the shell follows the orchestrator's
//! events.

use crate::events::PlayerEvent;
use encore_core::{Playlist, PlaylistSource, Track};

/// Page-level player state
#[derive(Debug, Clone)]
pub struct PlayerShell {
    playlist: Playlist,
    is_loading: bool,
    is_open: bool,
    current_track: Option<Track>,
    should_autoplay: bool,
    show_toast: bool,
}

impl Default for PlayerShell {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerShell {
    /// Shell waiting for its playlist
    pub fn new() -> Self {
        Self {
            playlist: Playlist::default(),
            is_loading: true,
            is_open: false,
            current_track: None,
            should_autoplay: false,
            show_toast: false,
        }
    }

    /// Fetch the playlist once
    ///
    /// A failed or empty fetch leaves the widget hidden. Once a playlist is
    /// loaded, later calls do nothing.
    pub fn load(&mut self, source: &mut dyn PlaylistSource) -> &Playlist {
        if !self.playlist.is_empty() {
            return &self.playlist;
        }
        self.is_loading = true;
        match source.fetch_playlist() {
            Ok(playlist) if !playlist.is_empty() => {
                tracing::info!("Loaded playlist with {} tracks", playlist.len());
                if self.current_track.is_none() {
                    self.current_track = playlist.get(0).cloned();
                }
                self.playlist = playlist;
            }
            Ok(_) => tracing::info!("Playlist is empty"),
            Err(e) => tracing::warn!("Failed to load playlist: {}", e),
        }
        self.is_loading = false;
        &self.playlist
    }

    /// The fetched playlist
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Whether the fetch is still outstanding
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Nothing is rendered while loading or for an empty playlist
    pub fn is_hidden(&self) -> bool {
        self.is_loading || self.playlist.is_empty()
    }

    /// Whether the panel is open
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Open or close the panel
    pub fn toggle_player(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Open or close the panel
    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    /// The externally owned current track
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Point at a different track
    pub fn set_current_track(&mut self, track: Option<Track>) {
        self.current_track = track;
    }

    /// The player switched tracks
    pub fn handle_track_change(&mut self, track: &Track) {
        self.current_track = Some(track.clone());
    }

    /// Cover image for the launcher button
    pub fn display_cover(&self) -> Option<&str> {
        self.current_track
            .as_ref()
            .and_then(|t| t.cover.as_deref())
            .filter(|c| !c.is_empty())
    }

    /// Whether the player should start on its own
    pub fn should_autoplay(&self) -> bool {
        self.should_autoplay
    }

    /// Set the autoplay flag directly
    pub fn set_should_autoplay(&mut self, autoplay: bool) {
        self.should_autoplay = autoplay;
    }

    /// Whether the autoplay consent prompt is shown
    pub fn show_toast(&self) -> bool {
        self.show_toast
    }

    /// Show or hide the autoplay consent prompt
    pub fn set_show_toast(&mut self, show: bool) {
        self.show_toast = show;
    }

    /// The user agreed to autoplay
    pub fn accept_autoplay(&mut self) {
        self.should_autoplay = true;
        self.show_toast = false;
    }

    /// The user declined autoplay
    pub fn decline_autoplay(&mut self) {
        self.should_autoplay = false;
        self.show_toast = false;
    }

    /// Follow a player event
    pub fn apply_event(&mut self, event: &PlayerEvent) {
        match event {
            PlayerEvent::TrackChanged { index, .. } => {
                if let Some(track) = self.playlist.get(*index).cloned() {
                    self.handle_track_change(&track);
                }
            }
            PlayerEvent::VisibilityChanged { visible } => self.is_open = *visible,
            _ => {}
        }
    }
}
