//! Error types for operations that cross the core boundary.
//!
//! Scene mutations never fail: invariant violations are corrected in place
//! and out-of-range inputs are clamped. Only the collaborators (persistence,
//! media, config) can fail, and those failures are recoverable.

use thiserror::Error;

/// Errors that can occur while talking to external collaborators
#[derive(Error, Debug)]
pub enum CanvasError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error from serde_json
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The persistence collaborator rejected a read or write
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The media store could not resolve or release a resource
    #[error("Media error: {0}")]
    Media(String),

    /// Engine configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// No canvas is currently open
    #[error("No canvas is open")]
    NoCanvas,

    /// A scene file declared an unsupported format version
    #[error("Unsupported scene version: {found} (max {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Result type alias for collaborator operations
pub type CanvasResult<T> = Result<T, CanvasError>;

impl From<String> for CanvasError {
    fn from(s: String) -> Self {
        CanvasError::Persistence(s)
    }
}

impl From<&str> for CanvasError {
    fn from(s: &str) -> Self {
        CanvasError::Persistence(s.to_string())
    }
}
