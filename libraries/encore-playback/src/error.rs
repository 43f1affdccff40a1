//! Error types for playback management

use thiserror::Error;

/// Playback errors
///
/// None of these reach the UI: the orchestrator logs them and degrades to
/// "controls present but playback doesn't start".
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Track URL cannot be played by the selected backend
    #[error("Unsupported media URL: {0}")]
    UnsupportedUrl(String),

    /// The platform refused to start playback (autoplay policy)
    #[error("Playback start rejected: {0}")]
    PlaybackRejected(String),

    /// The platform resource (element, widget, attachment point) is missing
    #[error("Playback resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The third-party widget script failed to load
    #[error("Widget script failed to load: {0}")]
    ScriptLoad(String),

    /// A call into the embedded widget failed
    #[error("Embedded widget error: {0}")]
    Widget(String),

    /// Persisted setting could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Core type error
    #[error(transparent)]
    Core(#[from] encore_core::CoreError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
