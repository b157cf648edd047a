//! Whole-buffer sample rate conversion
//!
//! Tracks are decoded completely before playback, so resampling runs once
//! over the full buffer rather than streaming. Uses rubato's sinc resampler
//! with a Blackman-Harris window.

use crate::error::{AudioError, Result};
use duaelmix_core::types::CHANNELS;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Frames fed to the resampler per call
const CHUNK_SIZE: usize = 1024;

fn sinc_params() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris,
    }
}

/// Resample interleaved stereo `samples` from `from_rate` to `to_rate`
///
/// The resampler's delay is trimmed so the output lines up with the input,
/// and the output length is `frames * to_rate / from_rate` (rounded).
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AudioError::Resampling(format!(
            "invalid rates {from_rate} -> {to_rate}"
        )));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_params(), CHUNK_SIZE, CHANNELS)
        .map_err(|e| AudioError::Resampling(format!("SincFixedIn creation failed: {e}")))?;

    let input = deinterleave(samples);
    let frames = input[0].len();
    let expected = (frames as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();

    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay); CHANNELS];
    let mut position = 0;

    while frames - position >= resampler.input_frames_next() {
        let needed = resampler.input_frames_next();
        let chunk: Vec<&[f32]> = input
            .iter()
            .map(|ch| &ch[position..position + needed])
            .collect();
        let processed = resampler
            .process(&chunk, None)
            .map_err(|e| AudioError::Resampling(e.to_string()))?;
        append(&mut output, processed);
        position += needed;
    }

    if position < frames {
        let rest: Vec<&[f32]> = input.iter().map(|ch| &ch[position..]).collect();
        let processed = resampler
            .process_partial(Some(rest.as_slice()), None)
            .map_err(|e| AudioError::Resampling(e.to_string()))?;
        append(&mut output, processed);
    }

    // Flush the filter tail until the delayed output is complete
    while output[0].len() < expected + delay {
        let processed = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| AudioError::Resampling(e.to_string()))?;
        if processed[0].is_empty() {
            break;
        }
        append(&mut output, processed);
    }

    Ok(interleave(&output, delay, expected))
}

fn deinterleave(samples: &[f32]) -> Vec<Vec<f32>> {
    let frames = samples.len() / CHANNELS;
    let mut channels = vec![Vec::with_capacity(frames); CHANNELS];
    for frame in samples.chunks_exact(CHANNELS) {
        for (channel, sample) in channels.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }
    channels
}

fn append(output: &mut [Vec<f32>], processed: Vec<Vec<f32>>) {
    for (channel, chunk) in output.iter_mut().zip(processed) {
        channel.extend(chunk);
    }
}

fn interleave(channels: &[Vec<f32>], skip: usize, frames: usize) -> Vec<f32> {
    let available = channels[0].len().saturating_sub(skip).min(frames);
    let mut interleaved = Vec::with_capacity(frames * CHANNELS);
    for frame in skip..skip + available {
        for channel in channels {
            interleaved.push(channel[frame]);
        }
    }
    // Pad when the tail flush came up short
    interleaved.resize(frames * CHANNELS, 0.0);
    interleaved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, rate: u32, frames: usize) -> Vec<f32> {
        (0..frames)
            .flat_map(|i| {
                let s = (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin() * 0.5;
                [s, s]
            })
            .collect()
    }

    #[test]
    fn same_rate_is_passthrough() {
        let input = sine(440.0, 44_100, 100);
        assert_eq!(resample(&input, 44_100, 44_100).unwrap(), input);
    }

    #[test]
    fn upsampling_scales_length() {
        let input = sine(440.0, 44_100, 44_100);
        let output = resample(&input, 44_100, 48_000).unwrap();
        assert_eq!(output.len(), 48_000 * 2);
    }

    #[test]
    fn downsampling_scales_length_and_keeps_energy() {
        let input = sine(440.0, 48_000, 4_800);
        let output = resample(&input, 48_000, 24_000).unwrap();
        assert_eq!(output.len(), 2_400 * 2);

        // Skip the edges, the middle must still carry the sine
        let middle = &output[1_000..3_800];
        let rms = (middle.iter().map(|s| s * s).sum::<f32>() / middle.len() as f32).sqrt();
        assert!(rms > 0.3, "rms {rms}");
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(resample(&[0.0, 0.0], 0, 48_000).is_err());
    }
}
