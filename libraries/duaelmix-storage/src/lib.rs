//! Duaelmix Storage
//!
//! Local persistence for Duaelmix.
//!
//! This crate provides:
//! - **Key-value stores**: small string state (session id, serialized playlist)
//! - **Blob stores**: the raw audio bytes of every imported file, keyed by name
//! - **Local state**: typed access to the playlist and session id on top of a
//!   key-value store
//!
//! Each backend comes in an in-memory flavour (tests, ephemeral sessions) and
//! a file-backed flavour (the CLI player).
//!
//! # Example
//!
//! ```rust
//! use duaelmix_core::{Playlist, Track, TrackPair};
//! use duaelmix_storage::{LocalState, MemoryKeyValueStore};
//! use std::sync::Arc;
//!
//! let state = LocalState::new(Arc::new(MemoryKeyValueStore::new()));
//!
//! let mut playlist = Playlist::new();
//! playlist.push(TrackPair::single(Track::new("a.mp3")));
//! state.save_playlist(&playlist).unwrap();
//!
//! assert_eq!(state.load_playlist().unwrap(), playlist);
//! ```

pub mod blobs;
pub mod kv;
pub mod local_state;

pub use blobs::{FsBlobStore, MemoryBlobStore};
pub use kv::{JsonFileKeyValueStore, MemoryKeyValueStore};
pub use local_state::{LocalState, KEY_PLAYLIST, KEY_UNIQUE_ID};
