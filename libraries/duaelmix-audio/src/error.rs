/// Audio-specific errors
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// The bytes are not in any format the decoder understands
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Resampling error
    #[error("Resampling error: {0}")]
    Resampling(String),

    /// Filter design error (bad cutoff or sample rate)
    #[error("Filter error: {0}")]
    Filter(String),

    /// Analyser FFT size is not a supported power of two
    #[error("Invalid FFT size {0}: expected a power of two between 32 and 32768")]
    InvalidFftSize(usize),

    /// No usable output device
    #[error("Output device not available: {0}")]
    DeviceNotFound(String),

    /// The output stream could not be built or started
    #[error("Stream error: {0}")]
    Stream(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Symphonia error
    #[error("Symphonia error: {0}")]
    Symphonia(String),
}

impl From<AudioError> for duaelmix_core::DuaelmixError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::UnsupportedFormat(msg) => duaelmix_core::DuaelmixError::NotAudio(msg),
            AudioError::DeviceNotFound(msg) => {
                duaelmix_core::DuaelmixError::UnsupportedEnvironment(msg)
            }
            AudioError::Io(e) => duaelmix_core::DuaelmixError::Io(e),
            other => duaelmix_core::DuaelmixError::audio(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duaelmix_core::DuaelmixError;

    #[test]
    fn unsupported_format_becomes_not_audio() {
        let err: DuaelmixError = AudioError::UnsupportedFormat("readme.txt".into()).into();
        assert!(err.is_not_audio());
    }

    #[test]
    fn decode_error_stays_audio() {
        let err: DuaelmixError = AudioError::DecodeError("bad packet".into()).into();
        assert!(matches!(err, DuaelmixError::Audio(_)));
    }
}
