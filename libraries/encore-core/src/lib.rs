//! Encore - Core Types
//!
//! Platform-agnostic domain types shared by the playback engine and its hosts.
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `Playlist`, `DurationCache`
//! - **Media URLs**: classification into native vs. embedded sources,
//!   embedded video id extraction, loose URL equivalence
//! - **Collaborator Traits**: `PlaylistSource`
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use encore_core::{MediaKind, Playlist, Track};
//!
//! let playlist = Playlist::new(vec![
//!     Track::new(1, "Intro", "/audio/intro.mp3"),
//!     Track::new(2, "Live Set", "https://youtu.be/dQw4w9WgXcQ"),
//! ]);
//!
//! assert_eq!(playlist.len(), 2);
//! assert_eq!(playlist.get(0).map(Track::kind), Some(MediaKind::Native));
//! assert_eq!(playlist.get(1).map(Track::kind), Some(MediaKind::Embedded));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod media;
pub mod source;
pub mod time;
pub mod track;
pub mod urls;

pub use error::{CoreError, Result};
pub use media::{embedded_video_id, MediaKind};
pub use source::{PlaylistSource, StaticPlaylistSource};
pub use time::format_time;
pub use track::{DurationCache, Playlist, Track, TrackId};
pub use urls::{normalize_url, same_media, urls_equivalent};
