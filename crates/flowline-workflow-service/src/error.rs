//! Error types for workflow services

use flowline_editor::EditorError;
use thiserror::Error;

/// Result type alias using ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors raised by the workflow services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No user is logged in
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Workflow id is unknown to the source
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    /// Workflow data failed validation
    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),

    /// Authentication failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Editor error (payload hydration etc.)
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Authentication errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Known email, wrong password
    #[error("Incorrect password")]
    IncorrectPassword,

    /// Email or password missing
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The credential store could not be read or written
    #[error("Credential storage error: {0}")]
    Storage(String),
}
