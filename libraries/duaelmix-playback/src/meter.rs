//! Level meter shown next to a playlist item
//!
//! While its pair is selected the meter follows the engine level; otherwise
//! it falls back toward zero in small steps.

/// Largest step the meter falls per decay tick
const MAX_DECAY_STEP: f32 = 0.1;

/// Displayed level in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelMeter {
    level: f32,
}

impl LevelMeter {
    pub fn new(initial: f32) -> Self {
        Self {
            level: initial.clamp(0.0, 1.0),
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Take a fresh engine reading
    pub fn sample(&mut self, level: f32) {
        self.level = level.clamp(0.0, 1.0);
    }

    /// One decay tick: fall by a tenth of the level, at most 0.1
    pub fn decay(&mut self) {
        self.level -= (self.level / 10.0).min(MAX_DECAY_STEP);
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new(0.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_initial_level() {
        assert_eq!(LevelMeter::default().level(), 0.8);
    }

    #[test]
    fn decay_is_proportional_and_never_negative() {
        let mut meter = LevelMeter::new(0.5);
        meter.decay();
        assert!((meter.level() - 0.45).abs() < 1e-6);

        for _ in 0..1_000 {
            meter.decay();
        }
        assert!(meter.level() >= 0.0);
        assert!(meter.level() < 1e-3);
    }

    #[test]
    fn samples_are_clamped() {
        let mut meter = LevelMeter::default();
        meter.sample(3.0);
        assert_eq!(meter.level(), 1.0);
        meter.sample(-1.0);
        assert_eq!(meter.level(), 0.0);
    }
}
