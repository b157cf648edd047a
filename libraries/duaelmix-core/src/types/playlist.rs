/// Playlist domain type
use super::track::{Track, TrackPair};
use serde::{Deserialize, Serialize};

/// Ordered sequence of track pairs in playback order
///
/// Indices are positional, not stable ids: every structural change
/// recomputes them. No pair in a playlist is ever empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Playlist {
    pairs: Vec<TrackPair>,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a playlist, dropping empty pairs and surplus tracks
    pub fn from_pairs(pairs: Vec<TrackPair>) -> Self {
        let pairs = pairs
            .into_iter()
            .filter_map(|pair| TrackPair::from_tracks(pair.into_tracks()))
            .collect();
        Self { pairs }
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when there are no pairs
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pair at `index`
    pub fn get(&self, index: usize) -> Option<&TrackPair> {
        self.pairs.get(index)
    }

    /// Mutable pair at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TrackPair> {
        self.pairs.get_mut(index)
    }

    /// All pairs in order
    pub fn pairs(&self) -> &[TrackPair] {
        &self.pairs
    }

    /// Iterate pairs in order
    pub fn iter(&self) -> std::slice::Iter<'_, TrackPair> {
        self.pairs.iter()
    }

    /// Append a pair at the end
    pub fn push(&mut self, pair: TrackPair) {
        self.pairs.push(pair);
    }

    /// Insert a pair at `index` (clamped to the end)
    pub fn insert(&mut self, index: usize, pair: TrackPair) {
        let index = index.min(self.pairs.len());
        self.pairs.insert(index, pair);
    }

    /// Remove and return the pair at `index`
    pub fn remove(&mut self, index: usize) -> Option<TrackPair> {
        if index < self.pairs.len() {
            Some(self.pairs.remove(index))
        } else {
            None
        }
    }

    /// Exchange two pairs
    pub fn swap(&mut self, a: usize, b: usize) {
        self.pairs.swap(a, b);
    }

    /// Remove every track failing `keep`, then prune pairs left empty
    ///
    /// Returns the removed tracks in playlist order.
    pub fn retain_tracks(&mut self, mut keep: impl FnMut(&Track) -> bool) -> Vec<Track> {
        let mut removed = Vec::new();
        for pair in &mut self.pairs {
            pair.retain(|track| {
                let kept = keep(track);
                if !kept {
                    removed.push(track.clone());
                }
                kept
            });
        }
        self.prune_empty();
        removed
    }

    /// Remove every empty pair; returns how many were removed
    pub fn prune_empty(&mut self) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|pair| !pair.is_empty());
        before - self.pairs.len()
    }

    /// Total number of tracks across all pairs
    pub fn track_count(&self) -> usize {
        self.pairs.iter().map(TrackPair::len).sum()
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a TrackPair;
    type IntoIter = std::slice::Iter<'a, TrackPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(names: &[&str]) -> TrackPair {
        TrackPair::from_tracks(names.iter().map(|n| Track::new(*n)).collect()).unwrap()
    }

    #[test]
    fn serializes_as_nested_arrays() {
        let playlist = Playlist::from_pairs(vec![pair(&["a", "b"]), pair(&["c"])]);
        let json = serde_json::to_value(&playlist).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0][1]["blobKey"], "b");
    }

    #[test]
    fn retain_tracks_prunes_empty_pairs() {
        let mut playlist = Playlist::from_pairs(vec![pair(&["a", "b"]), pair(&["c"])]);
        let removed = playlist.retain_tracks(|t| t.name != "c" && t.name != "a");
        assert_eq!(removed, vec![Track::new("a"), Track::new("c")]);
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.get(0).unwrap().tracks(), &[Track::new("b")]);
    }

    #[test]
    fn insert_clamps_to_end() {
        let mut playlist = Playlist::new();
        playlist.insert(5, pair(&["a"]));
        assert_eq!(playlist.len(), 1);
    }
}
