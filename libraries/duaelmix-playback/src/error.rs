//! Error types for playback and playlist management

use crate::drop_target::DragRef;
use duaelmix_core::DuaelmixError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The drop was rejected by the legality rules
    #[error("Illegal drop: {src:?} onto {dst:?}")]
    IllegalDrop {
        /// Dragged reference
        src: DragRef,
        /// Drop target
        dst: DragRef,
    },

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Shared state lock was poisoned by a panicking thread
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// Audio pipeline error
    #[error(transparent)]
    Audio(#[from] duaelmix_audio::AudioError),

    /// Storage, decode or validation error from the core
    #[error(transparent)]
    Core(#[from] DuaelmixError),
}

impl PlaybackError {
    /// Whether a blob with the same key already existed
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::Core(DuaelmixError::DuplicateKey(_)))
    }
}

impl From<PlaybackError> for DuaelmixError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Core(inner) => inner,
            PlaybackError::Audio(inner) => inner.into(),
            PlaybackError::IllegalDrop { .. } => DuaelmixError::validation(err.to_string()),
            other => DuaelmixError::audio(other.to_string()),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
