//! Gain ramps for the mode crossfade
//!
//! Each chain's gain is a linear ramp over the engine clock (in frames).
//! Ramps restart from whatever value the gain has at the moment they are
//! scheduled, so overlapping mode switches never jump.

/// A gain that moves linearly from one value to another between two frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRamp {
    from: f32,
    to: f32,
    start: u64,
    end: u64,
}

impl GainRamp {
    /// A gain holding `value`
    pub fn constant(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            start: 0,
            end: 0,
        }
    }

    /// Gain at clock frame `now`
    #[inline]
    pub fn value_at(&self, now: u64) -> f32 {
        if now >= self.end {
            return self.to;
        }
        if now <= self.start {
            return self.from;
        }
        let progress = (now - self.start) as f64 / (self.end - self.start) as f64;
        self.from + (self.to - self.from) * progress as f32
    }

    /// Ramp to `target`, starting at `now` and arriving `frames` later
    pub fn ramp_to(&mut self, target: f32, now: u64, frames: u64) {
        *self = Self {
            from: self.value_at(now),
            to: target,
            start: now,
            end: now + frames,
        };
    }

    /// Value the ramp is heading to
    pub fn target(&self) -> f32 {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_never_moves() {
        let gain = GainRamp::constant(0.5);
        assert_eq!(gain.value_at(0), 0.5);
        assert_eq!(gain.value_at(u64::MAX), 0.5);
    }

    #[test]
    fn linear_between_endpoints() {
        let mut gain = GainRamp::constant(0.0);
        gain.ramp_to(1.0, 100, 200);
        assert_eq!(gain.value_at(100), 0.0);
        assert!((gain.value_at(200) - 0.5).abs() < 1e-6);
        assert_eq!(gain.value_at(300), 1.0);
        assert_eq!(gain.value_at(1_000), 1.0);
    }

    #[test]
    fn retarget_mid_ramp_starts_from_current_value() {
        let mut gain = GainRamp::constant(0.0);
        gain.ramp_to(1.0, 0, 100);
        gain.ramp_to(0.0, 50, 100);
        assert!((gain.value_at(50) - 0.5).abs() < 1e-6);
        assert!((gain.value_at(100) - 0.25).abs() < 1e-6);
        assert_eq!(gain.value_at(150), 0.0);
    }

    #[test]
    fn zero_length_ramp_jumps() {
        let mut gain = GainRamp::constant(1.0);
        gain.ramp_to(0.0, 10, 0);
        assert_eq!(gain.value_at(10), 0.0);
    }
}
