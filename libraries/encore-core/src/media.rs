//! Media URL classification
//!
//! A track is either a direct media file played through the platform audio
//! primitive, or a page on the video-hosting platform played through the
//! embedded widget.

use serde::{Deserialize, Serialize};
use url::Url;

const EMBED_HOST_MARKERS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Which playback source a URL needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// Directly streamable media file
    Native,

    /// Video hosted by the third-party platform
    Embedded,
}

impl MediaKind {
    /// Classify a track URL
    pub fn classify(url: &str) -> Self {
        if EMBED_HOST_MARKERS.iter().any(|marker| url.contains(marker)) {
            Self::Embedded
        } else {
            Self::Native
        }
    }
}

/// Extract the video id from an embedded-video URL
///
/// Recognized forms:
/// - `youtube.com/watch?v=ID` (`v` anywhere in the query)
/// - `youtu.be/ID`
/// - `youtube.com/embed/ID`
///
/// Scheme-less URLs are accepted.
pub fn embedded_video_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = Url::parse(raw)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{}", raw.trim_start_matches("//"))).ok())?;
    let host = parsed.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let id = if host == "youtu.be" {
        parsed.path_segments()?.next().map(str::to_string)
    } else if host.ends_with("youtube.com") {
        let mut segments = parsed.path_segments()?;
        match segments.next() {
            Some("watch") => parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed") => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_urls() {
        assert_eq!(MediaKind::classify("/audio/song.mp3"), MediaKind::Native);
        assert_eq!(
            MediaKind::classify("https://cdn.example.com/a.ogg"),
            MediaKind::Native
        );
        assert_eq!(
            MediaKind::classify("https://www.youtube.com/watch?v=abc"),
            MediaKind::Embedded
        );
        assert_eq!(MediaKind::classify("https://youtu.be/abc"), MediaKind::Embedded);
    }

    #[test]
    fn extract_watch_id() {
        assert_eq!(
            embedded_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            embedded_video_id("https://www.youtube.com/watch?feature=share&v=xyz123&t=5").as_deref(),
            Some("xyz123")
        );
    }

    #[test]
    fn extract_short_and_embed_ids() {
        assert_eq!(
            embedded_video_id("https://youtu.be/short1?t=30").as_deref(),
            Some("short1")
        );
        assert_eq!(
            embedded_video_id("https://www.youtube.com/embed/emb_2#frag").as_deref(),
            Some("emb_2")
        );
        assert_eq!(
            embedded_video_id("youtube.com/watch?v=noscheme").as_deref(),
            Some("noscheme")
        );
    }

    #[test]
    fn reject_non_video_urls() {
        assert_eq!(embedded_video_id(""), None);
        assert_eq!(embedded_video_id("/audio/song.mp3"), None);
        assert_eq!(embedded_video_id("https://www.youtube.com/channel/abc"), None);
        assert_eq!(embedded_video_id("https://www.youtube.com/watch"), None);
    }
}
