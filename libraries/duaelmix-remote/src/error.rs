//! Error types for the remote mode channel.

use duaelmix_core::DuaelmixError;
use thiserror::Error;

/// Errors that can occur when publishing or following remote mode changes.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Malformed session id or mode value
    #[error("Invalid request: {0}")]
    Validation(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an unexpected status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse a server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The session store rejected the operation
    #[error("Session store error: {0}")]
    Store(String),
}

impl From<RemoteError> for DuaelmixError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Validation(msg) => DuaelmixError::Validation(msg),
            other => DuaelmixError::storage(other.to_string()),
        }
    }
}

/// Result type for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_core_validation() {
        let err: DuaelmixError = RemoteError::Validation("bad session".into()).into();
        assert!(matches!(err, DuaelmixError::Validation(msg) if msg == "bad session"));
    }

    #[test]
    fn server_error_maps_to_storage() {
        let err: DuaelmixError = RemoteError::ServerError {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(err, DuaelmixError::Storage(_)));
    }
}
