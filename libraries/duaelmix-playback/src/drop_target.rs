//! Drag and drop references into the playlist
//!
//! Every drag names a source and a target with a `DragRef`. Legality and
//! effect are both decided by exhaustive matches over the pair of
//! references, so a new variant cannot be forgotten in one place.

use duaelmix_core::{Playlist, SubIndex, Track, TrackPair};
use serde::{Deserialize, Serialize};

/// A reference to something draggable or droppable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DragRef {
    /// One track, addressed by pair and slot
    Track { pair: usize, sub: SubIndex },
    /// A whole pair
    TrackPair { pair: usize },
    /// The gap before `index` (`index == len` is the end of the list)
    Gap { index: usize },
    /// The trash can
    Trash,
}

/// Whether dropping `src` onto `dst` is allowed
pub fn can_drop(playlist: &Playlist, src: DragRef, dst: DragRef) -> bool {
    if src == dst || !is_valid_source(playlist, src) || !is_valid_target(playlist, dst) {
        return false;
    }

    match (src, dst) {
        (DragRef::Track { pair: sp, sub: ss }, DragRef::Track { pair: dp, sub: ds }) => {
            // Dropping a track into its own pair's empty slot would be a no-op
            let into_own_empty_slot = sp == dp && ds.index() > ss.index() && !is_occupied(playlist, dp, ds);
            !into_own_empty_slot
        }
        (DragRef::Track { .. }, DragRef::TrackPair { .. }) => false,
        (DragRef::Track { .. }, DragRef::Gap { .. } | DragRef::Trash) => true,

        (DragRef::TrackPair { .. }, DragRef::Track { .. }) => false,
        (DragRef::TrackPair { .. }, DragRef::TrackPair { .. } | DragRef::Trash) => true,
        (DragRef::TrackPair { pair }, DragRef::Gap { index }) => index != pair && index != pair + 1,

        (DragRef::Gap { .. } | DragRef::Trash, _) => false,
    }
}

/// Apply a legal drop, returning the tracks that went to the trash
///
/// The caller must have checked `can_drop`; illegal combinations leave the
/// playlist untouched. Empty pairs are pruned before returning.
pub(crate) fn apply(playlist: &mut Playlist, src: DragRef, dst: DragRef) -> Vec<Track> {
    let mut trashed = Vec::new();

    match (src, dst) {
        (DragRef::Track { pair: sp, sub: ss }, DragRef::Track { pair: dp, sub: ds }) => {
            if is_occupied(playlist, dp, ds) {
                swap_tracks(playlist, (sp, ss), (dp, ds));
            } else if let Some(track) = take_track(playlist, sp, ss) {
                if let Some(pair) = playlist.get_mut(dp) {
                    if let Err(track) = pair.push(track) {
                        tracing::error!("Pair {} is full, dropping {}", dp, track.name);
                    }
                }
            }
        }
        (DragRef::Track { pair: sp, sub: ss }, DragRef::Gap { index }) => {
            if let Some(track) = take_track(playlist, sp, ss) {
                let mut index = index;
                if playlist.get(sp).is_some_and(TrackPair::is_empty) {
                    playlist.remove(sp);
                    if sp < index {
                        index -= 1;
                    }
                }
                playlist.insert(index, TrackPair::single(track));
            }
        }
        (DragRef::Track { pair, sub }, DragRef::Trash) => {
            trashed.extend(take_track(playlist, pair, sub));
        }
        (DragRef::TrackPair { pair: a }, DragRef::TrackPair { pair: b }) => {
            playlist.swap(a, b);
        }
        (DragRef::TrackPair { pair }, DragRef::Gap { index }) => {
            if let Some(moved) = playlist.remove(pair) {
                let index = if pair < index { index - 1 } else { index };
                playlist.insert(index, moved);
            }
        }
        (DragRef::TrackPair { pair }, DragRef::Trash) => {
            if let Some(removed) = playlist.remove(pair) {
                trashed.extend(removed.into_tracks());
            }
        }
        (src, dst) => {
            tracing::warn!("Ignoring illegal drop {:?} onto {:?}", src, dst);
        }
    }

    playlist.prune_empty();
    trashed
}

fn is_valid_source(playlist: &Playlist, src: DragRef) -> bool {
    match src {
        DragRef::Track { pair, sub } => is_occupied(playlist, pair, sub),
        DragRef::TrackPair { pair } => pair < playlist.len(),
        DragRef::Gap { .. } | DragRef::Trash => false,
    }
}

fn is_valid_target(playlist: &Playlist, dst: DragRef) -> bool {
    match dst {
        DragRef::Track { pair, .. } | DragRef::TrackPair { pair } => pair < playlist.len(),
        DragRef::Gap { index } => index <= playlist.len(),
        DragRef::Trash => true,
    }
}

fn is_occupied(playlist: &Playlist, pair: usize, sub: SubIndex) -> bool {
    playlist.get(pair).is_some_and(|p| p.is_occupied(sub))
}

fn take_track(playlist: &mut Playlist, pair: usize, sub: SubIndex) -> Option<Track> {
    playlist.get_mut(pair)?.remove(sub)
}

fn swap_tracks(playlist: &mut Playlist, a: (usize, SubIndex), b: (usize, SubIndex)) {
    let (Some(first), Some(second)) = (track_at(playlist, a).cloned(), track_at(playlist, b).cloned())
    else {
        return;
    };
    replace_track(playlist, a, second);
    replace_track(playlist, b, first);
}

fn track_at(playlist: &Playlist, (pair, sub): (usize, SubIndex)) -> Option<&Track> {
    playlist.get(pair)?.get(sub)
}

fn replace_track(playlist: &mut Playlist, (pair, sub): (usize, SubIndex), track: Track) {
    if let Some(p) = playlist.get_mut(pair) {
        // Slot was checked occupied above
        let _ = p.replace(sub, track);
    }
}
