/// Track and track-pair domain types
use crate::error::DuaelmixError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One audio file in the playlist
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Display name (the original file name)
    pub name: String,

    /// Key of the audio bytes in the blob store
    pub blob_key: String,
}

impl Track {
    /// Create a track whose blob is keyed by its own name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            blob_key: name.clone(),
            name,
        }
    }

    /// Create a track with an explicit blob key
    pub fn with_blob_key(name: impl Into<String>, blob_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blob_key: blob_key.into(),
        }
    }
}

/// Slot within a track pair, which doubles as the global playback mode
///
/// `Driving` is the normal variant, `Driven` the alternate one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SubIndex {
    /// Primary/normal-mode variant (slot 0)
    #[default]
    Driving,
    /// Alternate/filtered-mode variant (slot 1)
    Driven,
}

impl SubIndex {
    /// Both slots in order
    pub const ALL: [SubIndex; 2] = [SubIndex::Driving, SubIndex::Driven];

    /// Slot position (0 or 1)
    pub fn index(self) -> usize {
        match self {
            SubIndex::Driving => 0,
            SubIndex::Driven => 1,
        }
    }

    /// Slot for a position, `None` beyond the second slot
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(SubIndex::Driving),
            1 => Some(SubIndex::Driven),
            _ => None,
        }
    }

    /// The other slot
    pub fn other(self) -> Self {
        match self {
            SubIndex::Driving => SubIndex::Driven,
            SubIndex::Driven => SubIndex::Driving,
        }
    }
}

impl From<SubIndex> for u8 {
    fn from(sub: SubIndex) -> Self {
        sub.index() as u8
    }
}

impl TryFrom<u8> for SubIndex {
    type Error = DuaelmixError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SubIndex::from_index(usize::from(value))
            .ok_or_else(|| DuaelmixError::validation(format!("sub index out of range: {value}")))
    }
}

impl fmt::Display for SubIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// One playlist entry: a driving track and, once paired, a driven track
///
/// Holds one or two tracks. A pair that loses its last track must be removed
/// from the playlist by whoever removed the track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackPair {
    tracks: Vec<Track>,
}

impl TrackPair {
    /// Maximum number of tracks in a pair
    pub const CAPACITY: usize = 2;

    /// Create a pair holding only a driving track
    pub fn single(track: Track) -> Self {
        Self {
            tracks: vec![track],
        }
    }

    /// Build a pair from loaded tracks
    ///
    /// Returns `None` for an empty list; tracks beyond the second are dropped.
    pub fn from_tracks(mut tracks: Vec<Track>) -> Option<Self> {
        if tracks.is_empty() {
            return None;
        }
        tracks.truncate(Self::CAPACITY);
        Some(Self { tracks })
    }

    /// Number of tracks (0, 1 or 2)
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// True once the last track has been removed
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// True when both slots are occupied
    pub fn is_full(&self) -> bool {
        self.tracks.len() >= Self::CAPACITY
    }

    /// Track in `slot`, if occupied
    pub fn get(&self, slot: SubIndex) -> Option<&Track> {
        self.tracks.get(slot.index())
    }

    /// Whether `slot` holds a track
    pub fn is_occupied(&self, slot: SubIndex) -> bool {
        slot.index() < self.tracks.len()
    }

    /// All tracks in slot order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Consume the pair, yielding its tracks
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    /// Append a track into the first empty slot
    ///
    /// Hands the track back if the pair is already full.
    pub fn push(&mut self, track: Track) -> Result<(), Track> {
        if self.is_full() {
            return Err(track);
        }
        self.tracks.push(track);
        Ok(())
    }

    /// Remove the track in `slot`; a driven track moves up into slot 0
    /// when the driving track is removed.
    pub fn remove(&mut self, slot: SubIndex) -> Option<Track> {
        if self.is_occupied(slot) {
            Some(self.tracks.remove(slot.index()))
        } else {
            None
        }
    }

    /// Replace the track in an occupied `slot`, returning the previous one
    ///
    /// Hands the new track back if the slot is empty.
    pub fn replace(&mut self, slot: SubIndex, track: Track) -> Result<Track, Track> {
        match self.tracks.get_mut(slot.index()) {
            Some(existing) => Ok(std::mem::replace(existing, track)),
            None => Err(track),
        }
    }

    /// Keep only the tracks matching `keep`
    pub fn retain(&mut self, keep: impl FnMut(&Track) -> bool) {
        self.tracks.retain(keep);
    }

    /// Blob keys of every track in the pair
    pub fn blob_keys(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.blob_key.as_str())
    }
}
