/// Stereo biquad filters
///
/// Single-track mode splits one buffer into two chains: one through an
/// all-pass (phase-matched to the other chain, flat magnitude) and one
/// through a high-pass.
use crate::error::{AudioError, Result};
use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F32};

/// Default corner of the all-pass chain, in Hz
pub const DEFAULT_ALL_PASS_HZ: f32 = 350.0;

/// Filter response
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    /// Flat magnitude, phase shift around the corner frequency
    AllPass,
    /// Attenuates everything below the cutoff
    HighPass,
}

impl FilterKind {
    fn biquad_type(self) -> Type<f32> {
        match self {
            Self::AllPass => Type::AllPass,
            Self::HighPass => Type::HighPass,
        }
    }
}

/// A biquad applied independently to the left and right channel
#[derive(Debug, Clone, Copy)]
pub struct StereoFilter {
    kind: FilterKind,
    frequency: f32,
    left: DirectForm2Transposed<f32>,
    right: DirectForm2Transposed<f32>,
}

impl StereoFilter {
    /// Build a filter of `kind` with its corner at `frequency` Hz
    pub fn new(kind: FilterKind, sample_rate: u32, frequency: f32) -> Result<Self> {
        let coefficients = Coefficients::<f32>::from_params(
            kind.biquad_type(),
            (sample_rate as f32).hz(),
            frequency.hz(),
            Q_BUTTERWORTH_F32,
        )
        .map_err(|e| {
            AudioError::Filter(format!(
                "{kind:?} at {frequency} Hz for {sample_rate} Hz: {e:?}"
            ))
        })?;

        Ok(Self {
            kind,
            frequency,
            left: DirectForm2Transposed::<f32>::new(coefficients),
            right: DirectForm2Transposed::<f32>::new(coefficients),
        })
    }

    /// All-pass with its phase corner at `corner` Hz
    pub fn all_pass(sample_rate: u32, corner: f32) -> Result<Self> {
        Self::new(FilterKind::AllPass, sample_rate, corner)
    }

    /// High-pass with the given cutoff
    pub fn high_pass(sample_rate: u32, cutoff: f32) -> Result<Self> {
        Self::new(FilterKind::HighPass, sample_rate, cutoff)
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Filter one stereo frame
    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.left.run(left), self.right.run(right))
    }

    /// Clear the filter memory
    pub fn reset(&mut self) {
        self.left.reset_state();
        self.right.reset_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 48_000;

    fn rms_after(filter: &mut StereoFilter, freq: f32) -> f32 {
        let frames = RATE as usize / 2;
        let mut sum = 0.0;
        let mut counted = 0;
        for i in 0..frames {
            let x = (2.0 * std::f32::consts::PI * freq * i as f32 / RATE as f32).sin();
            let (l, _) = filter.process(x, x);
            // Skip the transient
            if i > frames / 4 {
                sum += l * l;
                counted += 1;
            }
        }
        (sum / counted as f32).sqrt()
    }

    #[test]
    fn high_pass_attenuates_lows_and_keeps_highs() {
        let mut filter = StereoFilter::high_pass(RATE, 2_000.0).unwrap();
        let low = rms_after(&mut filter, 100.0);
        filter.reset();
        let high = rms_after(&mut filter, 8_000.0);

        assert!(low < 0.01, "100 Hz leaked through: {low}");
        assert!(high > 0.6, "8 kHz attenuated: {high}");
    }

    #[test]
    fn all_pass_keeps_magnitude() {
        let mut filter = StereoFilter::all_pass(RATE, DEFAULT_ALL_PASS_HZ).unwrap();
        for freq in [100.0, 350.0, 5_000.0] {
            filter.reset();
            let rms = rms_after(&mut filter, freq);
            assert!((rms - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.02, "{freq} Hz: {rms}");
        }
    }

    #[test]
    fn cutoff_above_nyquist_is_rejected() {
        let err = StereoFilter::high_pass(8_000, 5_000.0).unwrap_err();
        assert!(matches!(err, AudioError::Filter(_)));
    }
}
