//! Events
//!
//! Both the engine and the playlist model queue events instead of calling
//! back into the controller; the controller drains and handles them.

use duaelmix_core::TrackPair;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// The driving chain's source reached its end naturally
    ///
    /// Emitted at most once per `play`; never emitted by `reset`.
    TrackEnded,
}

/// Events emitted by the playlist model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaylistEvent {
    /// The selected pair (or its position) changed
    CurrentItemChanged {
        /// The pair now selected, if any
        item: Option<TrackPair>,
        /// Whether playback must stop (structural mutation) rather than
        /// continue into the new item
        stop_playing: bool,
    },
}
