/// On-disk player state: the playlist, the session id and the audio blobs
use crate::config::CliConfig;
use duaelmix_audio::SymphoniaDecoder;
use duaelmix_core::{BlobStore, Playlist};
use duaelmix_playback::{Controller, PlaybackEngine, PlaylistModel};
use duaelmix_remote::SessionId;
use duaelmix_storage::{FsBlobStore, JsonFileKeyValueStore, LocalState};
use std::sync::{Arc, Mutex};

/// Engine rate used when nothing will be rendered (imports, edits)
const OFFLINE_SAMPLE_RATE: u32 = 48_000;

pub struct Library {
    config: CliConfig,
    state: LocalState,
    blobs: Arc<FsBlobStore>,
}

impl Library {
    pub async fn open(config: CliConfig) -> anyhow::Result<Self> {
        let state = LocalState::new(Arc::new(JsonFileKeyValueStore::open(config.state_path())?));
        let blobs = Arc::new(FsBlobStore::open(config.blobs_path()).await?);
        tracing::debug!("Library opened at {}", config.storage.dir.display());

        Ok(Self {
            config,
            state,
            blobs,
        })
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn playlist(&self) -> anyhow::Result<Playlist> {
        Ok(self.state.load_playlist()?)
    }

    /// This player's session id, generated on first use
    pub fn session_id(&self) -> anyhow::Result<SessionId> {
        Ok(SessionId::parse(&self.state.session_id()?)?)
    }

    /// Controller for editing the playlist without playing it
    pub fn offline_controller(&self) -> anyhow::Result<Controller> {
        self.controller(OFFLINE_SAMPLE_RATE, SymphoniaDecoder::new())
    }

    /// Controller whose engine renders at `sample_rate`
    pub fn playback_controller(&self, sample_rate: u32) -> anyhow::Result<Controller> {
        self.controller(sample_rate, SymphoniaDecoder::with_target_rate(sample_rate))
    }

    fn controller(&self, sample_rate: u32, decoder: SymphoniaDecoder) -> anyhow::Result<Controller> {
        let playback = self.config.playback.clone();
        let model = PlaylistModel::load(self.state.clone())?;
        let engine = Arc::new(Mutex::new(PlaybackEngine::new(sample_rate, playback.clone())));

        Ok(Controller::new(
            model,
            engine,
            Arc::clone(&self.blobs) as Arc<dyn BlobStore>,
            Arc::new(decoder),
            playback,
        ))
    }
}

/// One line per pair: `index: driving | driven`
pub fn format_playlist(playlist: &Playlist, selected: Option<usize>) -> String {
    if playlist.is_empty() {
        return "Playlist is empty".to_string();
    }

    playlist
        .iter()
        .enumerate()
        .map(|(index, pair)| {
            let marker = if Some(index) == selected { '>' } else { ' ' };
            let names: Vec<&str> = pair.tracks().iter().map(|t| t.name.as_str()).collect();
            let driven = names.get(1).copied().unwrap_or("(unpaired)");
            let driving = names.first().copied().unwrap_or_default();
            format!("{marker}{index:>3}: {driving} | {driven}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use duaelmix_core::{Track, TrackPair};

    #[test]
    fn formats_pairs_and_selection() {
        let mut playlist = Playlist::new();
        playlist.push(TrackPair::from_tracks(vec![Track::new("a.mp3"), Track::new("b.mp3")]).unwrap());
        playlist.push(TrackPair::single(Track::new("c.mp3")));

        assert_eq!(
            format_playlist(&playlist, Some(1)),
            "   0: a.mp3 | b.mp3\n>  1: c.mp3 | (unpaired)"
        );
    }

    #[test]
    fn empty_playlist() {
        assert_eq!(format_playlist(&Playlist::new(), None), "Playlist is empty");
    }

    #[tokio::test]
    async fn library_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CliConfig::default();
        config.storage.dir = dir.path().to_path_buf();

        let session = {
            let library = Library::open(config.clone()).await.unwrap();
            library.session_id().unwrap()
        };

        let library = Library::open(config).await.unwrap();
        assert_eq!(library.session_id().unwrap(), session);
        assert!(library.playlist().unwrap().is_empty());
        assert!(dir.path().join("blobs").is_dir());
    }
}
