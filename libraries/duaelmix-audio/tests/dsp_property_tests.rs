//! Property tests for the filters and the analyser
//!
//! Whatever the input, the DSP used on the real-time path must stay finite
//! and the level must stay within [0, 1].

use duaelmix_audio::{a_weighting, FrequencyAnalyser, StereoFilter};
use proptest::prelude::*;

const SAMPLE_RATE: u32 = 48_000;

proptest! {
    #[test]
    fn filters_stay_finite(
        cutoff in 20.0f32..10_000.0,
        samples in prop::collection::vec(-1.0f32..=1.0, 1..2048),
    ) {
        let mut high_pass = StereoFilter::high_pass(SAMPLE_RATE, cutoff).unwrap();
        let mut all_pass = StereoFilter::all_pass(SAMPLE_RATE, cutoff).unwrap();

        for &s in &samples {
            let (l, r) = high_pass.process(s, -s);
            prop_assert!(l.is_finite() && r.is_finite());
            let (l, r) = all_pass.process(s, s * 0.5);
            prop_assert!(l.is_finite() && r.is_finite());
        }
    }

    #[test]
    fn level_is_bounded(
        amplitude in 0.0f32..=1.0,
        frequency in 20.0f32..20_000.0,
        frames in 1usize..4096,
    ) {
        let mut analyser = FrequencyAnalyser::new(SAMPLE_RATE, 1024, 0.8).unwrap();
        for i in 0..frames {
            let t = i as f32 / SAMPLE_RATE as f32;
            let s = amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin();
            analyser.push(s, s);
        }

        let level = analyser.level();
        prop_assert!((0.0..=1.0).contains(&level), "level {} out of range", level);
        prop_assert_eq!(analyser.byte_frequency_data().len(), analyser.bin_count());
    }

    #[test]
    fn a_weighting_is_positive_and_finite(frequency in 1.0f32..24_000.0) {
        let gain = a_weighting(frequency);
        prop_assert!(gain.is_finite());
        prop_assert!(gain > 0.0);
    }
}

#[test]
fn a_weighting_is_unity_at_one_kilohertz() {
    assert!((a_weighting(1_000.0) - 1.0).abs() < 0.01);
    assert!(a_weighting(50.0) < 0.1);
    assert!(a_weighting(2_500.0) > 1.0);
}

#[test]
fn silence_reads_as_zero_level() {
    let mut analyser = FrequencyAnalyser::new(SAMPLE_RATE, 1024, 0.0).unwrap();
    for _ in 0..2048 {
        analyser.push(0.0, 0.0);
    }
    assert_eq!(analyser.level(), 0.0);
}
