use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for parley-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the Parley chat client
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors, including a missing credential
    #[error("configuration error: {0}")]
    Config(String),

    /// Attachment could not be read
    #[error("attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    /// Provider construction errors
    #[error("provider error: {0}")]
    Provider(String),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),

    /// Validation errors
    #[error("validation error: {0}")]
    Validation(String),
}

/// Errors raised while ingesting an attachment
///
/// These never end the session: the caller shows a diagnostic and leaves the
/// transcript as it was.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Only plain text and markdown files are accepted
    #[error("unsupported file type: {} (expected .txt or .md)", .0.display())]
    UnsupportedType(PathBuf),

    /// The file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of a single completion round trip
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection, timeout or body read failure
    #[error("request failed: {0}")]
    Network(String),

    /// Endpoint answered with a non-success status
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Success status but the body does not carry a reply
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        Self::Status { status, reason: reason.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// HTTP status code, when the endpoint produced one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
