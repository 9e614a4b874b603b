//! Error types for the workflow editor

use thiserror::Error;

/// Result type alias using EditorError
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors that can occur in the editor's fallible plumbing
///
/// Editing operations themselves never fail loudly: invalid gestures are
/// rejected as no-ops. These errors cover snapshots, payloads and config.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression error
    #[error("Compression error: {0}")]
    Compression(String),

    /// A persisted payload does not describe a valid node sequence
    #[error("Invalid workflow payload: {0}")]
    InvalidPayload(String),

    /// Requested history snapshot does not exist
    #[error("History snapshot {index} out of range (len {len})")]
    SnapshotOutOfRange { index: usize, len: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    /// Create an invalid payload error with a message
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }
}
