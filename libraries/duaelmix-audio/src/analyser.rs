//! Frequency analyser and A-weighted level
//!
//! Keeps the most recent `fft_size` mono samples, and on demand produces a
//! byte spectrum the way a browser `AnalyserNode` does:
//! Blackman window, magnitude normalised by the FFT size, exponential
//! smoothing across snapshots, then decibels mapped linearly onto 0..=255.

use crate::error::{AudioError, Result};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

/// Lower end of the byte range, in dB
pub const MIN_DECIBELS: f32 = -100.0;

/// Upper end of the byte range, in dB
pub const MAX_DECIBELS: f32 = -30.0;

/// Smallest accepted FFT size
pub const MIN_FFT_SIZE: usize = 32;

/// Largest accepted FFT size
pub const MAX_FFT_SIZE: usize = 32_768;

/// Check that `fft_size` is a power of two in `MIN_FFT_SIZE..=MAX_FFT_SIZE`
pub fn validate_fft_size(fft_size: usize) -> Result<()> {
    if fft_size.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
        Ok(())
    } else {
        Err(AudioError::InvalidFftSize(fft_size))
    }
}

/// A-weighting gain for `frequency` Hz (linear, 1.0 at 1 kHz)
///
/// IEC 61672 curve:
/// `R_A(f) = 12194² f⁴ / ((f² + 20.6²) √((f² + 107.7²)(f² + 737.9²)) (f² + 12194²))`,
/// scaled by +2.00 dB so the curve passes through unity at 1 kHz.
pub fn a_weighting(frequency: f32) -> f32 {
    let f2 = f64::from(frequency) * f64::from(frequency);
    let numerator = 1.258_896_6 * 148_840_000.0 * f2 * f2;
    let denominator = (f2 + 424.36)
        * ((f2 + 11_599.29) * (f2 + 544_496.41)).sqrt()
        * (f2 + 148_840_000.0);
    (numerator / denominator) as f32
}

/// Spectrum analyser fed one stereo frame at a time
pub struct FrequencyAnalyser {
    sample_rate: u32,
    fft_size: usize,
    smoothing: f32,
    /// Ring of mono samples, `cursor` is the oldest
    history: Vec<f32>,
    cursor: usize,
    smoothed: Vec<f32>,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl FrequencyAnalyser {
    /// Create an analyser
    ///
    /// `smoothing` is the time constant in [0, 1) applied between
    /// consecutive snapshots.
    ///
    /// # Errors
    /// `InvalidFftSize` unless `fft_size` passes [`validate_fft_size`].
    pub fn new(sample_rate: u32, fft_size: usize, smoothing: f32) -> Result<Self> {
        validate_fft_size(fft_size)?;
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);

        Ok(Self {
            sample_rate,
            fft_size,
            smoothing: smoothing.clamp(0.0, 1.0),
            history: vec![0.0; fft_size],
            cursor: 0,
            smoothed: vec![0.0; fft_size / 2],
            window: blackman_window(fft_size),
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of frequency bins (half the FFT size)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Feed one stereo frame
    #[inline]
    pub fn push(&mut self, left: f32, right: f32) {
        self.history[self.cursor] = (left + right) * 0.5;
        self.cursor = (self.cursor + 1) % self.fft_size;
    }

    /// Forget all history and smoothing state
    pub fn clear(&mut self) {
        self.history.fill(0.0);
        self.smoothed.fill(0.0);
        self.cursor = 0;
    }

    /// Take a byte spectrum snapshot, updating the smoothing state
    pub fn byte_frequency_data(&mut self) -> Vec<u8> {
        let n = self.fft_size;
        for i in 0..n {
            let sample = self.history[(self.cursor + i) % n];
            self.scratch[i] = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let scale = 1.0 / n as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        self.smoothed
            .iter_mut()
            .zip(&self.scratch)
            .map(|(smoothed, bin)| {
                let magnitude = bin.norm() * scale;
                *smoothed = self.smoothing * *smoothed + (1.0 - self.smoothing) * magnitude;

                let db = 20.0 * smoothed.log10();
                if !db.is_finite() {
                    return 0;
                }
                (255.0 * (db - MIN_DECIBELS) / range).clamp(0.0, 255.0) as u8
            })
            .collect()
    }

    /// A-weighted RMS of a byte spectrum snapshot, in [0, 1]
    ///
    /// Each byte is multiplied by the A-weighting gain of its bin (the browser
    /// player divided by it, which boosts bass instead of attenuating it).
    pub fn level(&mut self) -> f32 {
        let bytes = self.byte_frequency_data();
        if bytes.is_empty() {
            return 0.0;
        }

        let sum: f32 = bytes
            .iter()
            .enumerate()
            .map(|(i, &byte)| {
                let frequency = (i as f32 + 0.5) * self.sample_rate as f32 / self.fft_size as f32;
                let weighted = f32::from(byte) * a_weighting(frequency);
                weighted * weighted
            })
            .sum();

        ((sum / bytes.len() as f32).sqrt() / 255.0).min(1.0)
    }
}

impl fmt::Debug for FrequencyAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrequencyAnalyser")
            .field("sample_rate", &self.sample_rate)
            .field("fft_size", &self.fft_size)
            .field("smoothing", &self.smoothing)
            .finish_non_exhaustive()
    }
}

fn blackman_window(n: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    (0..n)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / n as f32;
            A0 - A1 * x.cos() + A2 * (2.0 * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 48_000;

    fn fed_with(freq: f32, amplitude: f32) -> FrequencyAnalyser {
        let mut analyser = FrequencyAnalyser::new(RATE, 1024, 0.5).unwrap();
        for i in 0..4096 {
            let s = amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / RATE as f32).sin();
            analyser.push(s, s);
        }
        analyser
    }

    #[test]
    fn a_weighting_is_unity_at_1khz() {
        assert!((a_weighting(1_000.0) - 1.0).abs() < 0.01);
        assert!(a_weighting(50.0) < 0.05);
        assert!(a_weighting(2_500.0) > 1.0);
    }

    #[test]
    fn silence_has_zero_level() {
        let mut analyser = FrequencyAnalyser::new(RATE, 1024, 0.5).unwrap();
        assert_eq!(analyser.level(), 0.0);
        assert!(analyser.byte_frequency_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn tone_peaks_in_its_bin() {
        let mut analyser = fed_with(3_000.0, 0.8);
        let bytes = analyser.byte_frequency_data();
        assert_eq!(bytes.len(), 512);

        let peak = bytes
            .iter()
            .enumerate()
            .max_by_key(|(_, b)| **b)
            .map(|(i, _)| i)
            .unwrap();
        // 3 kHz / (48 kHz / 1024) = bin 64
        assert!((63..=65).contains(&peak), "peak at bin {peak}");
    }

    #[test]
    fn loud_midrange_beats_loud_bass() {
        let mid = fed_with(2_000.0, 0.8).level();
        let bass = fed_with(40.0, 0.8).level();
        assert!(mid > bass, "mid {mid} <= bass {bass}");
        assert!(mid > 0.0 && mid <= 1.0);
    }

    #[test]
    fn clear_drops_history() {
        let mut analyser = fed_with(1_000.0, 0.8);
        analyser.clear();
        assert_eq!(analyser.level(), 0.0);
    }

    #[test]
    fn rejects_unusable_fft_sizes() {
        for size in [0, 1, 16, 1000, 1023, 65_536] {
            assert!(
                matches!(
                    FrequencyAnalyser::new(RATE, size, 0.5),
                    Err(AudioError::InvalidFftSize(s)) if s == size
                ),
                "{size} should be rejected"
            );
        }
        for size in [MIN_FFT_SIZE, 1024, MAX_FFT_SIZE] {
            assert!(validate_fft_size(size).is_ok());
        }
    }
}
