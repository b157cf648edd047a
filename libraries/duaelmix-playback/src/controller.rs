//! Controller
//!
//! Glues the playlist model, the engine and the stores together:
//! - selection changes load (or stop) playback
//! - the engine's end of track advances the selection
//! - mode changes, remote or manual, crossfade the engine
//!
//! The model and the engine each sit behind a `std::sync::Mutex`; the engine
//! is shared with the audio callback. Locks are never held across an await.

use crate::drop_target::DragRef;
use crate::engine::PlaybackEngine;
use crate::error::{PlaybackError, Result};
use crate::events::{PlaybackEvent, PlaylistEvent};
use crate::playlist::PlaylistModel;
use crate::types::PlaybackConfig;
use duaelmix_core::{AudioBuffer, AudioDecoder, BlobStore, Playlist, SubIndex, Track, TrackPair};
use futures_util::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Player state as seen from outside
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub playlist: Playlist,
    pub selected_index: Option<usize>,
    pub current_sub_index: SubIndex,
    pub playing: bool,
    pub repeat: bool,
    pub progress: Option<f64>,
}

/// Binds user actions, engine events and remote mode signals
pub struct Controller {
    model: Mutex<PlaylistModel>,
    engine: Arc<Mutex<PlaybackEngine>>,
    blobs: Arc<dyn BlobStore>,
    decoder: Arc<dyn AudioDecoder>,
    config: PlaybackConfig,
    playing: AtomicBool,
    repeat: AtomicBool,
    deletes: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    pub fn new(
        model: PlaylistModel,
        engine: Arc<Mutex<PlaybackEngine>>,
        blobs: Arc<dyn BlobStore>,
        decoder: Arc<dyn AudioDecoder>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            model: Mutex::new(model),
            engine,
            blobs,
            decoder,
            config,
            playing: AtomicBool::new(false),
            repeat: AtomicBool::new(false),
            deletes: Mutex::new(Vec::new()),
        }
    }

    /// Startup: drop playlist entries whose audio is gone from the blob store
    pub async fn start(&self) -> Result<()> {
        let keys = self.blobs.list_keys().await?;
        self.lock_model()?.purge_missing_stored_tracks(&keys);
        self.dispatch_playlist_events().await
    }

    /// The engine, for wiring into an audio output
    pub fn engine(&self) -> Arc<Mutex<PlaybackEngine>> {
        Arc::clone(&self.engine)
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn is_repeat(&self) -> bool {
        self.repeat.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Result<PlayerSnapshot> {
        let progress = self.progress()?;
        let model = self.lock_model()?;
        Ok(PlayerSnapshot {
            playlist: model.playlist().clone(),
            selected_index: model.selected_index(),
            current_sub_index: model.current_sub_index(),
            playing: self.is_playing(),
            repeat: self.is_repeat(),
            progress,
        })
    }

    /// Position over duration of the loaded pair
    pub fn progress(&self) -> Result<Option<f64>> {
        Ok(self.lock_engine()?.progress())
    }

    /// Current engine level for the meter of the selected pair
    pub fn level(&self) -> Result<f32> {
        Ok(self.lock_engine()?.level())
    }

    // ===== Import =====

    /// Import one file
    ///
    /// Verifies the bytes decode, stores them under `name` and appends a
    /// single-track pair. Returns `None` when the file is not audio.
    ///
    /// # Errors
    /// A `DuplicateKey` core error when `name` is already stored; the
    /// playlist is not touched in that case.
    pub async fn add_file(&self, name: &str, bytes: Vec<u8>) -> Result<Option<Track>> {
        let (bytes, decoded) = self.decode(name.to_string(), bytes).await?;
        if let Err(e) = decoded {
            if e.is_not_audio() {
                tracing::debug!("Skipping {}: not audio", name);
            } else {
                tracing::warn!("Skipping {}: {}", name, e);
            }
            return Ok(None);
        }

        self.blobs.put(name, bytes).await?;

        let track = Track::new(name);
        self.lock_model()?.append_track(track.clone());
        tracing::info!("Added {}", name);
        Ok(Some(track))
    }

    /// Import several files concurrently; results are in input order
    pub async fn add_files(&self, files: Vec<(String, Vec<u8>)>) -> Vec<Result<Option<Track>>> {
        join_all(
            files
                .into_iter()
                .map(|(name, bytes)| async move { self.add_file(&name, bytes).await }),
        )
        .await
    }

    // ===== Playlist mutations =====

    /// Drag and drop; trashed blobs are deleted in the background
    pub async fn move_item(&self, src: DragRef, dst: DragRef) -> Result<()> {
        let trashed = self.lock_model()?.move_item(src, dst)?;
        for track in trashed {
            self.spawn_blob_delete(track.blob_key);
        }
        self.dispatch_playlist_events().await
    }

    /// Wait for every background blob delete started so far
    ///
    /// Mutations never wait on their deletes; call this before shutting the
    /// runtime down so none is cut short.
    pub async fn flush_deletes(&self) {
        let pending = match self.deletes.lock() {
            Ok(mut deletes) => std::mem::take(&mut *deletes),
            Err(_) => return,
        };
        for handle in pending {
            if let Err(e) = handle.await {
                tracing::warn!("Blob delete task failed: {}", e);
            }
        }
    }

    // ===== Transport =====

    /// Start or stop playback
    ///
    /// Starting on an empty playlist does nothing. Starting with nothing
    /// loaded selects (and so loads) the current or first pair.
    pub async fn set_playing(&self, play: bool) -> Result<()> {
        if !play {
            self.pause_playback()?;
            return Ok(());
        }

        if self.lock_model()?.is_empty() {
            return Ok(());
        }

        let loaded = {
            let mut engine = self.lock_engine()?;
            engine.unpause();
            engine.is_loaded()
        };
        self.playing.store(true, Ordering::SeqCst);

        if !loaded {
            self.lock_model()?.select_relative(0);
            self.dispatch_playlist_events().await?;
        }
        Ok(())
    }

    pub async fn toggle_playing(&self) -> Result<()> {
        self.set_playing(!self.is_playing()).await
    }

    /// Flip repeat; returns the new value
    pub fn toggle_repeat(&self) -> bool {
        !self.repeat.fetch_xor(true, Ordering::SeqCst)
    }

    pub async fn next_track(&self) -> Result<()> {
        self.lock_engine()?.reset();
        self.lock_model()?.select_relative(1);
        self.dispatch_playlist_events().await
    }

    /// Go back one pair, or restart the current one once it has played
    /// past the restart threshold
    pub async fn previous_track(&self) -> Result<()> {
        let threshold = self.config.previous_restart_threshold.as_secs_f64();
        let delta = {
            let mut engine = self.lock_engine()?;
            let early = engine.track_position().is_some_and(|p| p < threshold);
            engine.reset();
            if !self.is_playing() || early {
                -1
            } else {
                0
            }
        };
        self.lock_model()?.select_relative(delta);
        self.dispatch_playlist_events().await
    }

    // ===== Mode =====

    /// Make `sub` audible; the path for both remote and manual mode changes
    pub fn select_sub_index(&self, sub: SubIndex) -> Result<()> {
        self.lock_engine()?
            .update_gain_selector(sub, self.config.mode_transition);
        self.lock_model()?.set_current_sub_index(sub);
        tracing::debug!("Mode switched to {}", sub);
        Ok(())
    }

    /// Apply every mode delivered on `modes` until the sender goes away
    pub async fn follow_modes(&self, mut modes: mpsc::Receiver<SubIndex>) {
        while let Some(sub) = modes.recv().await {
            if let Err(e) = self.select_sub_index(sub) {
                tracing::error!("Failed to apply mode {}: {}", sub, e);
            }
        }
        tracing::debug!("Mode channel closed");
    }

    // ===== Engine events =====

    /// Handle everything the engine queued since the last poll
    pub async fn poll(&self) -> Result<()> {
        let events = self.lock_engine()?.drain_events();
        for event in events {
            match event {
                PlaybackEvent::TrackEnded => self.on_track_ended().await?,
            }
        }
        Ok(())
    }

    async fn on_track_ended(&self) -> Result<()> {
        let delta = if self.is_repeat() { 0 } else { 1 };
        tracing::debug!("Track ended, advancing by {}", delta);
        self.lock_model()?.select_relative(delta);
        self.dispatch_playlist_events().await
    }

    // ===== Internals =====

    async fn dispatch_playlist_events(&self) -> Result<()> {
        loop {
            let events = self.lock_model()?.drain_events();
            if events.is_empty() {
                return Ok(());
            }
            for event in events {
                match event {
                    PlaylistEvent::CurrentItemChanged { item, stop_playing } => {
                        self.on_current_item_changed(item, stop_playing).await?;
                    }
                }
            }
        }
    }

    async fn on_current_item_changed(
        &self,
        item: Option<TrackPair>,
        stop_playing: bool,
    ) -> Result<()> {
        if self.is_playing() && stop_playing {
            self.pause_playback()?;
            self.lock_engine()?.reset();
        }

        match item {
            Some(item) if self.is_playing() => self.load_pair(item).await,
            _ => Ok(()),
        }
    }

    /// Fetch, decode and play a pair
    ///
    /// Missing blobs and undecodable audio abort the load with a warning.
    async fn load_pair(&self, item: TrackPair) -> Result<()> {
        let loads = item.tracks().iter().map(|track| self.load_track(track));
        let mut buffers = Vec::with_capacity(item.len());
        for loaded in join_all(loads).await {
            match loaded {
                Ok(buffer) => buffers.push(Arc::new(buffer)),
                Err(e) => {
                    tracing::warn!("Aborting load: {}", e);
                    return Ok(());
                }
            }
        }

        // The selection may have moved on while we were decoding
        let still_current = self.lock_model()?.current_item() == Some(&item);
        if !still_current || !self.is_playing() {
            tracing::debug!("Discarding stale load");
            return Ok(());
        }

        self.lock_engine()?.play(buffers)?;
        tracing::info!(
            "Playing {}",
            item.tracks()
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(" + ")
        );
        Ok(())
    }

    async fn load_track(&self, track: &Track) -> Result<AudioBuffer> {
        let bytes = self.blobs.get(&track.blob_key).await?;
        let (_, decoded) = self.decode(track.name.clone(), bytes).await?;
        Ok(decoded?)
    }

    /// Decode on the blocking pool; hands the bytes back for storing
    async fn decode(
        &self,
        name: String,
        bytes: Vec<u8>,
    ) -> Result<(Vec<u8>, duaelmix_core::Result<AudioBuffer>)> {
        let decoder = Arc::clone(&self.decoder);
        tokio::task::spawn_blocking(move || {
            let decoded = decoder.decode(&name, &bytes);
            (bytes, decoded)
        })
        .await
        .map_err(|e| PlaybackError::InvalidOperation(format!("decode task failed: {e}")))
    }

    fn pause_playback(&self) -> Result<()> {
        self.lock_engine()?.pause();
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn spawn_blob_delete(&self, key: String) {
        let blobs = Arc::clone(&self.blobs);
        let handle = tokio::spawn(async move {
            match blobs.delete(&key).await {
                Ok(()) => tracing::debug!("Deleted blob {}", key),
                Err(e) => tracing::warn!("Failed to delete blob {}: {}", key, e),
            }
        });
        if let Ok(mut deletes) = self.deletes.lock() {
            deletes.retain(|pending| !pending.is_finished());
            deletes.push(handle);
        }
    }

    fn lock_model(&self) -> Result<MutexGuard<'_, PlaylistModel>> {
        self.model
            .lock()
            .map_err(|_| PlaybackError::LockPoisoned("playlist"))
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, PlaybackEngine>> {
        self.engine
            .lock()
            .map_err(|_| PlaybackError::LockPoisoned("engine"))
    }
}
