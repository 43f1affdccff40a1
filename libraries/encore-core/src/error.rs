/// Core error types for Encore
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Encore
#[derive(Error, Debug)]
pub enum CoreError {
    /// A track record failed validation
    #[error("Invalid track {id}: {reason}")]
    InvalidTrack { id: i64, reason: String },

    /// Playlist body could not be parsed
    #[error("Malformed playlist response: {0}")]
    Json(#[from] serde_json::Error),

    /// The playlist collaborator failed to deliver
    #[error("Playlist fetch failed: {0}")]
    Fetch(String),
}

impl CoreError {
    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }
}
