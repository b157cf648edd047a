//! Duaelmix Core
//!
//! Platform-agnostic core types, traits, and error handling for Duaelmix,
//! the dual-track player.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackPair`, `Playlist`, `SubIndex`, `AudioBuffer`
//! - **Capability Traits**: `KeyValueStore`, `BlobStore`, `AudioDecoder`
//! - **Error Handling**: Unified `DuaelmixError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use duaelmix_core::{Playlist, SubIndex, Track, TrackPair};
//!
//! let mut playlist = Playlist::new();
//! let mut pair = TrackPair::single(Track::new("driving.mp3"));
//! pair.push(Track::new("driven.mp3")).unwrap();
//! playlist.push(pair);
//!
//! let driven = playlist.get(0).and_then(|pair| pair.get(SubIndex::Driven));
//! assert_eq!(driven.map(|t| t.name.as_str()), Some("driven.mp3"));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{DuaelmixError, Result};
pub use traits::{AudioDecoder, BlobStore, KeyValueStore};
pub use types::{AudioBuffer, Playlist, SubIndex, Track, TrackPair};
