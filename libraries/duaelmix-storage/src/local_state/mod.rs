//! Typed local state on top of a key-value store
//!
//! Holds the two pieces of per-installation state:
//! - the unique session id used to address remote mode commands
//! - the serialized playlist
//!
//! # Example
//!
//! ```rust
//! use duaelmix_storage::{LocalState, MemoryKeyValueStore};
//! use std::sync::Arc;
//!
//! let state = LocalState::new(Arc::new(MemoryKeyValueStore::new()));
//! let id = state.session_id().unwrap();
//! assert_eq!(id.len(), 10);
//! assert_eq!(state.session_id().unwrap(), id);
//! ```

use duaelmix_core::{KeyValueStore, Playlist, Result, Track, TrackPair};
use rand::Rng;
use std::sync::Arc;

/// Key holding the session id
pub const KEY_UNIQUE_ID: &str = "uniqueId";

/// Key holding the serialized playlist
pub const KEY_PLAYLIST: &str = "playlist";

/// Length of a generated session id
const SESSION_ID_LEN: usize = 10;

/// Alphabet of a generated session id (base 36, lowercase)
const SESSION_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Typed access to the playlist and session id
#[derive(Clone)]
pub struct LocalState {
    store: Arc<dyn KeyValueStore>,
}

impl LocalState {
    /// Wrap a key-value store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted playlist
    ///
    /// A missing value, malformed JSON, or anything that is not a list of
    /// track lists yields an empty playlist. Empty pairs are dropped and
    /// pairs holding more than two tracks are truncated.
    pub fn load_playlist(&self) -> Result<Playlist> {
        let Some(raw) = self.store.get(KEY_PLAYLIST)? else {
            return Ok(Playlist::new());
        };

        match serde_json::from_str::<Vec<Vec<Track>>>(&raw) {
            Ok(pairs) => Ok(Playlist::from_pairs(
                pairs.into_iter().filter_map(TrackPair::from_tracks).collect(),
            )),
            Err(e) => {
                tracing::warn!("Stored playlist is not list-shaped, starting empty: {}", e);
                Ok(Playlist::new())
            }
        }
    }

    /// Persist the playlist
    pub fn save_playlist(&self, playlist: &Playlist) -> Result<()> {
        let raw = serde_json::to_string(playlist)?;
        self.store.set(KEY_PLAYLIST, &raw)
    }

    /// The installation's session id, generated and persisted on first use
    pub fn session_id(&self) -> Result<String> {
        if let Some(id) = self.store.get(KEY_UNIQUE_ID)?.filter(|id| !id.is_empty()) {
            return Ok(id);
        }

        let id = generate_session_id(&mut rand::thread_rng());
        self.store.set(KEY_UNIQUE_ID, &id)?;
        tracing::info!("Generated new session id {}", id);
        Ok(id)
    }
}

/// Generate a 10-character lowercase base-36 id
pub fn generate_session_id(rng: &mut impl Rng) -> String {
    (0..SESSION_ID_LEN)
        .map(|_| {
            let digit = rng.gen_range(0..SESSION_ID_ALPHABET.len());
            char::from(SESSION_ID_ALPHABET[digit])
        })
        .collect()
}
