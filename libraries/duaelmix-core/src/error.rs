/// Core error types for Duaelmix
use thiserror::Error;

/// Result type alias using `DuaelmixError`
pub type Result<T> = std::result::Result<T, DuaelmixError>;

/// Core error type for Duaelmix
///
/// Failures are always scoped to a single playlist item or request;
/// nothing here is fatal to the whole process.
#[derive(Error, Debug)]
pub enum DuaelmixError {
    /// Malformed input (e.g. a remote mode request). Not retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A blob with this key already exists
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// No blob stored under this key
    #[error("Not found: {0}")]
    NotFound(String),

    /// The bytes could not be decoded as audio
    #[error("Not audio: {0}")]
    NotAudio(String),

    /// A persistence backend is unavailable in this environment
    #[error("Unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Audio decoding/playback errors
    #[error("Audio error: {0}")]
    Audio(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl DuaelmixError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an audio error
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Create a not-audio error
    pub fn not_audio(msg: impl Into<String>) -> Self {
        Self::NotAudio(msg.into())
    }

    /// Create an unsupported environment error
    pub fn unsupported_environment(msg: impl Into<String>) -> Self {
        Self::UnsupportedEnvironment(msg.into())
    }

    /// Whether this error is an expected, silently-handled outcome
    /// (the file was simply not audio).
    pub fn is_not_audio(&self) -> bool {
        matches!(self, Self::NotAudio(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_key() {
        let err = DuaelmixError::DuplicateKey("a.mp3".to_string());
        assert_eq!(err.to_string(), "Duplicate key: a.mp3");
    }

    #[test]
    fn not_audio_is_flagged() {
        assert!(DuaelmixError::not_audio("garbage").is_not_audio());
        assert!(!DuaelmixError::storage("disk full").is_not_audio());
    }
}
