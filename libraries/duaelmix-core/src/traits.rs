/// Capability traits for Duaelmix
///
/// The persistence backends and the audio decoder are external collaborators;
/// these traits are the seams the rest of the workspace programs against.
use crate::error::Result;
use crate::types::AudioBuffer;
use async_trait::async_trait;
use std::collections::HashSet;

/// Synchronous string-keyed key-value store
///
/// Used for small pieces of local state (the session id and the serialized
/// playlist). Implementations must be safe to share between threads.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Asynchronous byte-blob store keyed by name
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`
    ///
    /// # Errors
    /// Fails with `DuaelmixError::DuplicateKey` if `key` already exists.
    /// Existing blobs are never overwritten.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Retrieve the blob stored under `key`
    ///
    /// # Errors
    /// Fails with `DuaelmixError::NotFound` if `key` is absent.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete the blob stored under `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List every key currently stored
    async fn list_keys(&self) -> Result<HashSet<String>>;
}

/// Audio decoder capability
///
/// Implementers decode a complete encoded file held in memory into an
/// `AudioBuffer` at the playback sample rate.
pub trait AudioDecoder: Send + Sync {
    /// Decode `bytes` into interleaved stereo samples
    ///
    /// `name` is the original file name; implementations may use its
    /// extension as a format hint.
    ///
    /// # Errors
    /// Returns `DuaelmixError::NotAudio` if the bytes are not decodable audio.
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<AudioBuffer>;
}
