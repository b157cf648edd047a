/// Audio-related types

/// Number of interleaved channels in every decoded `AudioBuffer`
pub const CHANNELS: usize = 2;

/// Audio buffer containing decoded samples
///
/// Samples are stored as f32 in the range [-1.0, 1.0].
/// Interleaved stereo: [L, R, L, R, ...]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Audio samples (f32, interleaved stereo)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new stereo audio buffer
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        debug_assert!(samples.len() % CHANNELS == 0, "odd sample count");
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a silent buffer of `frames` frames
    pub fn silence(frames: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; frames * CHANNELS], sample_rate)
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / CHANNELS
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Get one stereo frame, or `None` past the end
    #[inline]
    pub fn frame(&self, index: usize) -> Option<(f32, f32)> {
        let base = index * CHANNELS;
        match self.samples.get(base..base + CHANNELS) {
            Some([left, right]) => Some((*left, *right)),
            _ => None,
        }
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
