//! Track and playlist types
//!
//! Tracks are immutable once fetched. The playlist keeps insertion order,
//! which is both the display order and the playback order.

use crate::error::{CoreError, Result};
use crate::media::MediaKind;
use crate::urls::urls_equivalent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// Track identifier (database row id of the playlist entry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(i64);

impl TrackId {
    /// Create a new track ID
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TrackId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A playable entry of the playlist
///
/// Mirrors the record served by the playlist collaborator:
/// `{ id, title, artist, url, cover, duration }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Row id
    pub id: TrackId,

    /// Display title
    pub title: String,

    /// Artist name, if known
    #[serde(default)]
    pub artist: Option<String>,

    /// Direct media URL or embedded-video page URL
    pub url: String,

    /// Cover image URL
    #[serde(default)]
    pub cover: Option<String>,

    /// Stored duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
}

impl Track {
    /// Create a track with only the required fields
    pub fn new(id: i64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: TrackId(id),
            title: title.into(),
            artist: None,
            url: url.into(),
            cover: None,
            duration: None,
        }
    }

    /// Builder: set the artist
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Builder: set the stored duration
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Which playback source this track needs
    pub fn kind(&self) -> MediaKind {
        MediaKind::classify(&self.url)
    }

    /// Validate and normalize a freshly deserialized record
    ///
    /// Zero, negative or non-finite durations are treated as unknown.
    fn normalized(mut self) -> Result<Self> {
        if self.url.trim().is_empty() {
            return Err(CoreError::InvalidTrack {
                id: self.id.get(),
                reason: "empty url".to_string(),
            });
        }
        self.duration = self.duration.filter(|d| d.is_finite() && *d > 0.0);
        self.artist = self.artist.filter(|a| !a.is_empty());
        self.cover = self.cover.filter(|c| !c.is_empty());
        Ok(self)
    }
}

/// Ordered, immutable-per-session list of tracks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Create a playlist from tracks in playback order
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Parse the playlist collaborator's JSON array
    ///
    /// Records that are malformed or have an empty URL are skipped with a
    /// warning rather than failing the whole playlist. A body that is not a
    /// JSON array is an error.
    pub fn from_json(body: &str) -> Result<Self> {
        let rows: Vec<serde_json::Value> = serde_json::from_str(body)?;
        let tracks = rows
            .into_iter()
            .enumerate()
            .filter_map(|(position, row)| {
                let parsed = serde_json::from_value::<Track>(row)
                    .map_err(CoreError::from)
                    .and_then(Track::normalized);
                match parsed {
                    Ok(track) => Some(track),
                    Err(e) => {
                        tracing::warn!("Skipping playlist entry {}: {}", position, e);
                        None
                    }
                }
            })
            .collect();
        Ok(Self { tracks })
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the playlist has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// All tracks in order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Iterate tracks in order
    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Locate a track supplied from outside the playlist
    ///
    /// Matches by id first; only when no id matches does it fall back to
    /// URL equivalence.
    pub fn position_of(&self, target: &Track, origin: Option<&Url>) -> Option<usize> {
        self.tracks
            .iter()
            .position(|t| t.id == target.id)
            .or_else(|| {
                self.tracks
                    .iter()
                    .position(|t| urls_equivalent(&t.url, &target.url, origin))
            })
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

/// Durations reported by the playback backends, keyed by track
///
/// Stored durations are often missing for embedded videos; whatever the
/// backend learns at runtime takes precedence for display.
#[derive(Debug, Clone, Default)]
pub struct DurationCache {
    learned: HashMap<TrackId, f64>,
}

impl DurationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a duration reported for a track
    ///
    /// Returns true if the stored value changed.
    pub fn record(&mut self, id: TrackId, seconds: f64) -> bool {
        if !seconds.is_finite() || seconds <= 0.0 {
            return false;
        }
        match self.learned.insert(id, seconds) {
            Some(previous) => (previous - seconds).abs() > f64::EPSILON,
            None => true,
        }
    }

    /// Learned duration for a track
    pub fn get(&self, id: TrackId) -> Option<f64> {
        self.learned.get(&id).copied()
    }

    /// Duration to show next to a track: learned value, else stored value
    pub fn display_duration(&self, track: &Track) -> Option<f64> {
        self.get(track.id).or(track.duration)
    }
}
