/// Player configuration
use anyhow::Context;
use duaelmix_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of environment overrides, e.g. `DUAELMIX_STORAGE_DIR=/srv/duaelmix`
pub const ENV_PREFIX: &str = "DUAELMIX";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub remote: RemoteSettings,

    /// Only settable from the config file
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Holds `state.json` and the `blobs/` directory
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RemoteSettings {
    /// Base URL of a duaelmix-server; remote control is off without it
    #[serde(default)]
    pub url: Option<String>,

    /// Poll interval of the remote state in milliseconds
    #[serde(default)]
    pub interval: Option<u64>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

impl RemoteSettings {
    pub fn poll_interval(&self) -> Duration {
        self.interval
            .map_or(duaelmix_remote::DEFAULT_POLL_INTERVAL, Duration::from_millis)
    }
}

impl CliConfig {
    /// Load configuration from `path` (skipped if missing) and environment
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("_")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .and_then(config::Config::try_deserialize)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

        config
            .playback
            .validate()
            .with_context(|| format!("Invalid [playback] settings in {}", path.display()))?;
        Ok(config)
    }

    pub fn state_path(&self) -> PathBuf {
        self.storage.dir.join("state.json")
    }

    pub fn blobs_path(&self) -> PathBuf {
        self.storage.dir.join("blobs")
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./duaelmix-data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = CliConfig::default();
        assert_eq!(config.storage.dir, PathBuf::from("./duaelmix-data"));
        assert_eq!(config.remote.url, None);
        assert_eq!(config.remote.poll_interval(), duaelmix_remote::DEFAULT_POLL_INTERVAL);
        assert_eq!(config.state_path(), PathBuf::from("./duaelmix-data/state.json"));
    }

    #[test]
    fn reads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[storage]\ndir = \"/tmp/mix\"\n\n[remote]\nurl = \"http://localhost:8080\"\ninterval = 250\n\n[playback]\ndriven_filter_hz = 1500.0"
        )
        .unwrap();

        let config = CliConfig::load_from(file.path()).unwrap();
        assert_eq!(config.blobs_path(), PathBuf::from("/tmp/mix/blobs"));
        assert_eq!(config.remote.url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.remote.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.playback.driven_filter_hz, 1500.0);
        assert_eq!(config.playback.fft_size, 1024);
    }

    #[test]
    fn rejects_unusable_fft_size() {
        for fft_size in ["0", "1000"] {
            let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
            writeln!(file, "[playback]\nfft_size = {fft_size}").unwrap();

            let err = CliConfig::load_from(file.path()).unwrap_err();
            assert!(
                format!("{err:#}").contains("Invalid FFT size"),
                "unexpected error: {err:#}"
            );
        }
    }
}
