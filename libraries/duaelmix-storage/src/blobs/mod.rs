//! Blob stores - raw audio bytes keyed by track name
//!
//! Keys are never overwritten: `put` on an existing key fails with
//! `DuplicateKey`, mirroring an add-only object store.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use duaelmix_core::{BlobStore, DuaelmixError, Result};
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// In-memory blob store
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// True when nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(key) {
            return Err(DuaelmixError::DuplicateKey(key.to_string()));
        }
        blobs.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| DuaelmixError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.blobs.write().await.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<HashSet<String>> {
        Ok(self.blobs.read().await.keys().cloned().collect())
    }
}

/// Longest key, in bytes, whose encoded file name fits a 255-byte name limit
pub const MAX_FS_KEY_LEN: usize = 191;

/// Directory-backed blob store
///
/// Each blob is one file whose name is the URL-safe base64 encoding of its
/// key, so arbitrary track names map to valid file names. Keys are limited to
/// [`MAX_FS_KEY_LEN`] bytes.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    base_path: PathBuf,
}

impl FsBlobStore {
    /// Open (or create) a blob store rooted at `base_path`
    ///
    /// # Errors
    /// Fails with `UnsupportedEnvironment` if the directory cannot be created.
    pub async fn open(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            DuaelmixError::unsupported_environment(format!(
                "blob directory {} unavailable: {e}",
                base_path.display()
            ))
        })?;
        Ok(Self { base_path })
    }

    /// Root directory of the store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.base_path.join(URL_SAFE_NO_PAD.encode(key.as_bytes()))
    }

    /// Whether `key` can be stored as a file at all
    fn is_storable(key: &str) -> bool {
        !key.is_empty() && key.len() <= MAX_FS_KEY_LEN
    }

    fn decode_file_name(name: &str) -> Option<String> {
        let bytes = URL_SAFE_NO_PAD.decode(name).ok()?;
        String::from_utf8(bytes).ok()
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        if !Self::is_storable(key) {
            return Err(DuaelmixError::validation(format!(
                "blob key must be 1 to {MAX_FS_KEY_LEN} bytes, got {} bytes",
                key.len()
            )));
        }
        let path = self.blob_path(key);

        // create_new makes the existence check and the create one atomic step
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(DuaelmixError::DuplicateKey(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let written = async {
            file.write_all(&bytes).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path).await {
                tracing::warn!("Failed to remove partial blob {}: {}", key, cleanup);
            }
            return Err(e.into());
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        if !Self::is_storable(key) {
            return Err(DuaelmixError::NotFound(key.to_string()));
        }
        match fs::read(self.blob_path(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DuaelmixError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if !Self::is_storable(key) {
            return Ok(());
        }
        match fs::remove_file(self.blob_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_keys(&self) -> Result<HashSet<String>> {
        let mut keys = HashSet::new();
        let mut entries = fs::read_dir(&self.base_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            match name.to_str().and_then(Self::decode_file_name) {
                Some(key) => {
                    keys.insert(key);
                }
                None => tracing::debug!("Skipping foreign file in blob store: {:?}", name),
            }
        }

        Ok(keys)
    }
}
