//! Configuration for the engine and the controller

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback tuning
///
/// Defaults reproduce the reference player: a 2 kHz high-pass on the driven
/// chain of a single track, quarter-second mode crossfades and a 1024-point
/// analyser with 0.5 smoothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// High-pass cutoff of the driven chain in single-track mode (Hz)
    pub driven_filter_hz: f32,

    /// Corner of the all-pass on the driving chain in single-track mode (Hz)
    pub driving_filter_hz: f32,

    /// Length of the gain ramp when the mode changes
    pub mode_transition: Duration,

    /// Analyser FFT size (power of two)
    pub fft_size: usize,

    /// Analyser smoothing time constant in [0, 1)
    pub smoothing: f32,

    /// `previous` restarts the current pair once playback passed this point
    pub previous_restart_threshold: Duration,

    /// Level meter initial value
    pub meter_initial_level: f32,

    /// How often the meter samples the engine while its pair is selected
    pub meter_poll_interval: Duration,

    /// How often the meter decays otherwise
    pub meter_decay_interval: Duration,

    /// How often the player refreshes progress
    pub progress_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            driven_filter_hz: 2_000.0,
            driving_filter_hz: duaelmix_audio::filter::DEFAULT_ALL_PASS_HZ,
            mode_transition: Duration::from_millis(250),
            fft_size: 1024,
            smoothing: 0.5,
            previous_restart_threshold: Duration::from_secs(3),
            meter_initial_level: 0.8,
            meter_poll_interval: Duration::from_millis(25),
            meter_decay_interval: Duration::from_millis(50),
            progress_interval: Duration::from_millis(500),
        }
    }
}

impl PlaybackConfig {
    /// Reject values the engine cannot run with
    ///
    /// # Errors
    /// An audio error for an unusable FFT size, `InvalidOperation` for a
    /// smoothing constant outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        duaelmix_audio::validate_fft_size(self.fft_size)?;
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(PlaybackError::InvalidOperation(format!(
                "smoothing must be within [0, 1], got {}",
                self.smoothing
            )));
        }
        Ok(())
    }
}
