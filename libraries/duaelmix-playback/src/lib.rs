//! Duaelmix - Playback Management
//!
//! Dual-track playback for Duaelmix.
//!
//! This crate provides:
//! - `PlaybackEngine`: two synchronized chains, gain crossfade between them,
//!   level metering and end-of-track detection
//! - `PlaylistModel`: the ordered track pairs, selection and drag/drop
//!   mutations with their legality rules
//! - `Controller`: wires selection, engine events and mode changes together
//! - `LevelMeter`: the decaying meter next to a playlist item
//!
//! # Architecture
//!
//! The engine knows nothing about the playlist, the model knows nothing
//! about audio. Both queue events (`drain_events`) which the controller
//! handles. Audio output is platform code: it only needs to call
//! `PlaybackEngine::process_audio` from its callback.
//!
//! # Example: Engine
//!
//! ```rust
//! use duaelmix_core::{AudioBuffer, SubIndex};
//! use duaelmix_playback::{PlaybackConfig, PlaybackEngine};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let mut engine = PlaybackEngine::new(48_000, PlaybackConfig::default());
//! let driving = Arc::new(AudioBuffer::silence(48_000, 48_000));
//! let driven = Arc::new(AudioBuffer::silence(48_000, 48_000));
//! engine.play(vec![driving, driven]).unwrap();
//!
//! engine.update_gain_selector(SubIndex::Driven, Duration::from_millis(250));
//!
//! let mut out = vec![0.0; 2 * 12_000];
//! engine.process_audio(&mut out);
//! assert_eq!(engine.gain(SubIndex::Driven), Some(1.0));
//! assert_eq!(engine.track_position(), Some(0.25));
//! ```
//!
//! # Example: Playlist
//!
//! ```rust
//! use duaelmix_core::{SubIndex, Track};
//! use duaelmix_playback::{DragRef, PlaylistModel};
//! use duaelmix_storage::{LocalState, MemoryKeyValueStore};
//! use std::sync::Arc;
//!
//! let state = LocalState::new(Arc::new(MemoryKeyValueStore::new()));
//! let mut model = PlaylistModel::load(state).unwrap();
//! model.append_track(Track::new("a.mp3"));
//! model.append_track(Track::new("b.mp3"));
//!
//! // Pair b.mp3 with a.mp3
//! model
//!     .move_item(
//!         DragRef::Track { pair: 1, sub: SubIndex::Driving },
//!         DragRef::Track { pair: 0, sub: SubIndex::Driven },
//!     )
//!     .unwrap();
//! assert_eq!(model.len(), 1);
//! assert!(model.playlist().get(0).unwrap().is_full());
//! ```

pub mod controller;
pub mod crossfade;
pub mod drop_target;
pub mod engine;
pub mod error;
pub mod events;
pub mod meter;
pub mod playlist;
pub mod types;

pub use controller::{Controller, PlayerSnapshot};
pub use crossfade::GainRamp;
pub use drop_target::{can_drop, DragRef};
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use events::{PlaybackEvent, PlaylistEvent};
pub use meter::LevelMeter;
pub use playlist::PlaylistModel;
pub use types::PlaybackConfig;
