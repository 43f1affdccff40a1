//! Playlist collaborator
//!
//! The playlist is read exactly once when the player starts. Where it comes
//! from (HTTP endpoint, embedded JSON, database) is up to the host.

use crate::error::Result;
use crate::track::{Playlist, Track};

/// Supplier of the session playlist
pub trait PlaylistSource {
    /// Fetch the playlist in playback order
    ///
    /// # Errors
    /// Returns an error if the collaborator could not deliver a playlist
    fn fetch_playlist(&mut self) -> Result<Playlist>;
}

/// Playlist source backed by an in-memory list
///
/// Useful when the host page already embeds the playlist.
#[derive(Debug, Clone, Default)]
pub struct StaticPlaylistSource {
    tracks: Vec<Track>,
}

impl StaticPlaylistSource {
    /// Create a source that always yields `tracks`
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Create a source from a JSON response body
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(Self {
            tracks: Playlist::from_json(body)?.tracks().to_vec(),
        })
    }
}

impl PlaylistSource for StaticPlaylistSource {
    fn fetch_playlist(&mut self) -> Result<Playlist> {
        Ok(Playlist::new(self.tracks.clone()))
    }
}
