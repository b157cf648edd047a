//! Playlist model
//!
//! Owns the playlist, the selection and the audible sub-index. Every
//! structural mutation is written back to local state and announced with a
//! `CurrentItemChanged` event.

use crate::drop_target::{self, DragRef};
use crate::error::{PlaybackError, Result};
use crate::events::PlaylistEvent;
use duaelmix_core::{Playlist, SubIndex, Track, TrackPair};
use duaelmix_storage::LocalState;
use std::collections::HashSet;

/// In-memory playlist plus selection state
pub struct PlaylistModel {
    playlist: Playlist,
    selected_index: Option<usize>,
    current_sub_index: SubIndex,
    state: LocalState,
    pending_events: Vec<PlaylistEvent>,
}

impl PlaylistModel {
    /// Load the persisted playlist; nothing is selected
    pub fn load(state: LocalState) -> Result<Self> {
        let playlist = state.load_playlist()?;
        tracing::info!(
            "Loaded playlist with {} pairs ({} tracks)",
            playlist.len(),
            playlist.track_count()
        );

        Ok(Self {
            playlist,
            selected_index: None,
            current_sub_index: SubIndex::Driving,
            state,
            pending_events: Vec::new(),
        })
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// The selected pair, if any
    pub fn current_item(&self) -> Option<&TrackPair> {
        self.playlist.get(self.selected_index?)
    }

    pub fn current_sub_index(&self) -> SubIndex {
        self.current_sub_index
    }

    pub fn set_current_sub_index(&mut self, sub: SubIndex) {
        self.current_sub_index = sub;
    }

    /// Append `track` as a new single-track pair
    pub fn append_track(&mut self, track: Track) {
        tracing::debug!("Appending {}", track.name);
        self.playlist.push(TrackPair::single(track));
        self.persist();
    }

    /// Drop every track whose blob is not in `stored_keys`
    ///
    /// Returns the removed tracks.
    pub fn purge_missing_stored_tracks(&mut self, stored_keys: &HashSet<String>) -> Vec<Track> {
        let removed = self
            .playlist
            .retain_tracks(|track| stored_keys.contains(&track.blob_key));

        if !removed.is_empty() {
            tracing::warn!("Purged {} tracks with no stored audio", removed.len());
            self.after_structural_change();
        }
        removed
    }

    /// Whether dropping `src` onto `dst` is allowed
    pub fn can_drop(&self, src: DragRef, dst: DragRef) -> bool {
        drop_target::can_drop(&self.playlist, src, dst)
    }

    /// Apply a drag and drop
    ///
    /// Returns the tracks moved to the trash; deleting their blobs is up to
    /// the caller.
    ///
    /// # Errors
    /// `IllegalDrop` when `can_drop` rejects the combination. The playlist is
    /// left untouched.
    pub fn move_item(&mut self, src: DragRef, dst: DragRef) -> Result<Vec<Track>> {
        if !self.can_drop(src, dst) {
            return Err(PlaybackError::IllegalDrop { src, dst });
        }

        let trashed = drop_target::apply(&mut self.playlist, src, dst);
        tracing::debug!("Moved {:?} onto {:?}", src, dst);
        self.after_structural_change();
        Ok(trashed)
    }

    /// Move the selection by `delta` with wraparound
    ///
    /// An unset selection counts as 0. No-op (and no event) on an empty
    /// playlist.
    pub fn select_relative(&mut self, delta: isize) {
        let len = self.playlist.len();
        if len == 0 {
            return;
        }

        let current = self.selected_index.unwrap_or(0) as isize;
        let index = (current + delta).rem_euclid(len as isize) as usize;
        self.selected_index = Some(index);
        self.emit_current_item_changed(false);
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaylistEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn after_structural_change(&mut self) {
        self.clamp_selection();
        self.persist();
        self.emit_current_item_changed(true);
    }

    /// Keep the selection pointing at an existing pair
    fn clamp_selection(&mut self) {
        let len = self.playlist.len();
        if let Some(index) = self.selected_index {
            if index >= len {
                self.selected_index = len.checked_sub(1);
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = self.state.save_playlist(&self.playlist) {
            tracing::error!("Failed to persist playlist: {}", e);
        }
    }

    fn emit_current_item_changed(&mut self, stop_playing: bool) {
        self.pending_events.push(PlaylistEvent::CurrentItemChanged {
            item: self.current_item().cloned(),
            stop_playing,
        });
    }
}
