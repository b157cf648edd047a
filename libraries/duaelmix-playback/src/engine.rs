//! Synchronized dual-chain playback engine
//!
//! The engine renders two source chains mixed through per-chain gains. Its
//! clock is the render cursor: every frame rendered while not suspended
//! advances it by one, so time only moves when audio is pulled.
//!
//! ```text
//! buffer 0 ─▶ [all-pass]  ─▶ gain 0 ─┐
//!                                    ├─▶ analyser ─▶ output
//! buffer 1 ─▶ [high-pass] ─▶ gain 1 ─┘
//! ```
//!
//! Filters are only inserted when a single buffer feeds both chains.

use crate::crossfade::GainRamp;
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::types::PlaybackConfig;
use duaelmix_audio::{FrequencyAnalyser, StereoFilter};
use duaelmix_core::types::CHANNELS;
use duaelmix_core::{AudioBuffer, SubIndex};
use std::sync::Arc;
use std::time::Duration;

/// One source feeding one gain
#[derive(Debug)]
struct SourceChain {
    buffer: Arc<AudioBuffer>,
    filter: Option<StereoFilter>,
}

impl SourceChain {
    #[inline]
    fn render(&mut self, offset: usize) -> Option<(f32, f32)> {
        let (left, right) = self.buffer.frame(offset)?;
        Some(match self.filter.as_mut() {
            Some(filter) => filter.process(left, right),
            None => (left, right),
        })
    }
}

/// Everything that exists only while a pair is loaded
#[derive(Debug)]
struct PlaybackSession {
    chains: [SourceChain; 2],
    gains: [GainRamp; 2],
    analyser: FrequencyAnalyser,
    /// Clock frame both chains started at
    start: u64,
    ended: bool,
}

/// Dual-chain playback engine
#[derive(Debug)]
pub struct PlaybackEngine {
    config: PlaybackConfig,
    sample_rate: u32,
    clock: u64,
    suspended: bool,
    /// Audible chain; survives `reset`
    selector: SubIndex,
    session: Option<PlaybackSession>,
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackEngine {
    /// Create an idle engine rendering at `sample_rate`
    pub fn new(sample_rate: u32, config: PlaybackConfig) -> Self {
        Self {
            config,
            sample_rate,
            clock: 0,
            suspended: false,
            selector: SubIndex::Driving,
            session: None,
            pending_events: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start playing one or two buffers in sync
    ///
    /// One buffer feeds both chains (chain 0 through an all-pass, chain 1
    /// through the high-pass); two buffers feed one chain each, unfiltered.
    /// Any existing session is reset first. Single-track play also resumes
    /// a suspended clock, dual-track play does not.
    ///
    /// # Errors
    /// `InvalidOperation` for zero or more than two buffers; an audio error
    /// for a filter that cannot be built at this sample rate or an unusable
    /// analyser FFT size.
    pub fn play(&mut self, buffers: Vec<Arc<AudioBuffer>>) -> Result<()> {
        self.reset();

        for buffer in &buffers {
            if buffer.sample_rate != self.sample_rate {
                tracing::warn!(
                    "Buffer at {} Hz played on a {} Hz engine",
                    buffer.sample_rate,
                    self.sample_rate
                );
            }
        }

        let chains = match <[Arc<AudioBuffer>; 2]>::try_from(buffers) {
            Ok([driving, driven]) => [
                SourceChain {
                    buffer: driving,
                    filter: None,
                },
                SourceChain {
                    buffer: driven,
                    filter: None,
                },
            ],
            Err(buffers) if buffers.len() == 1 => {
                let buffer = Arc::clone(&buffers[0]);
                self.unpause();
                [
                    SourceChain {
                        buffer: Arc::clone(&buffer),
                        filter: Some(StereoFilter::all_pass(
                            self.sample_rate,
                            self.config.driving_filter_hz,
                        )?),
                    },
                    SourceChain {
                        buffer,
                        filter: Some(StereoFilter::high_pass(
                            self.sample_rate,
                            self.config.driven_filter_hz,
                        )?),
                    },
                ]
            }
            Err(buffers) => {
                return Err(PlaybackError::InvalidOperation(format!(
                    "play needs one or two buffers, got {}",
                    buffers.len()
                )))
            }
        };

        let gains = SubIndex::ALL.map(|sub| GainRamp::constant(self.selected_gain(sub)));

        // One timestamp for both chains
        let start = self.clock;
        self.session = Some(PlaybackSession {
            chains,
            gains,
            analyser: FrequencyAnalyser::new(
                self.sample_rate,
                self.config.fft_size,
                self.config.smoothing,
            )?,
            start,
            ended: false,
        });

        tracing::debug!("Playback session started at frame {}", start);
        Ok(())
    }

    /// Stop and drop the current session. Idempotent; never emits `TrackEnded`.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("Playback session reset");
        }
    }

    /// Make `selector` audible, fading over `transition`
    ///
    /// Applies to the running session (if any) and to every later session.
    pub fn update_gain_selector(&mut self, selector: SubIndex, transition: Duration) {
        self.selector = selector;
        let frames = (transition.as_secs_f64() * f64::from(self.sample_rate)).round() as u64;
        let now = self.clock;
        let targets = SubIndex::ALL.map(|sub| self.selected_gain(sub));

        if let Some(session) = self.session.as_mut() {
            for (gain, target) in session.gains.iter_mut().zip(targets) {
                gain.ramp_to(target, now, frames);
            }
        }
    }

    pub fn selector(&self) -> SubIndex {
        self.selector
    }

    /// Suspend the clock; output goes silent and positions freeze
    pub fn pause(&mut self) {
        self.suspended = true;
    }

    /// Resume the clock
    pub fn unpause(&mut self) {
        self.suspended = false;
    }

    pub fn is_paused(&self) -> bool {
        self.suspended
    }

    /// Whether a pair is loaded
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Seconds since both chains started, `None` when idle
    pub fn track_position(&self) -> Option<f64> {
        let session = self.session.as_ref()?;
        Some((self.clock - session.start) as f64 / f64::from(self.sample_rate))
    }

    /// Duration of chain 0's buffer in seconds, `None` when idle
    pub fn track_duration(&self) -> Option<f64> {
        let session = self.session.as_ref()?;
        Some(session.chains[0].buffer.duration_secs())
    }

    /// Position over duration, `None` when idle
    pub fn progress(&self) -> Option<f64> {
        let position = self.track_position()?;
        let duration = self.track_duration()?;
        if duration <= 0.0 {
            return Some(1.0);
        }
        Some((position / duration).min(1.0))
    }

    /// Current gain of one chain, `None` when idle
    pub fn gain(&self, sub: SubIndex) -> Option<f32> {
        let session = self.session.as_ref()?;
        Some(session.gains[sub.index()].value_at(self.clock))
    }

    /// A-weighted level of the analyser's current spectrum, 0 when idle
    pub fn level(&mut self) -> f32 {
        self.session
            .as_mut()
            .map_or(0.0, |session| session.analyser.level())
    }

    /// Render interleaved stereo into `output`, advancing the clock
    pub fn process_audio(&mut self, output: &mut [f32]) {
        if self.suspended {
            output.fill(0.0);
            return;
        }

        for frame in output.chunks_exact_mut(CHANNELS) {
            let (left, right) = match self.session.as_mut() {
                Some(session) => Self::render_frame(session, self.clock, &mut self.pending_events),
                None => (0.0, 0.0),
            };
            frame[0] = left;
            frame[1] = right;
            self.clock += 1;
        }
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn selected_gain(&self, sub: SubIndex) -> f32 {
        if sub == self.selector {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    fn render_frame(
        session: &mut PlaybackSession,
        now: u64,
        events: &mut Vec<PlaybackEvent>,
    ) -> (f32, f32) {
        let offset = (now - session.start) as usize;
        let (mut left, mut right) = (0.0, 0.0);

        for (chain, gain) in session.chains.iter_mut().zip(&session.gains) {
            if let Some((l, r)) = chain.render(offset) {
                let g = gain.value_at(now);
                left += l * g;
                right += r * g;
            }
        }
        session.analyser.push(left, right);

        if !session.ended && offset + 1 >= session.chains[0].buffer.frames() {
            session.ended = true;
            events.push(PlaybackEvent::TrackEnded);
        }

        (left, right)
    }
}
