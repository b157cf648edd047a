//! Decoder tests against WAV files synthesised in memory

use duaelmix_audio::{AudioError, SymphoniaDecoder};
use duaelmix_core::AudioDecoder;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

fn wav_bytes(channels: u16, sample_rate: u32, frames: usize, value: i16) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..frames {
            for ch in 0..channels {
                // Left positive, everything else negative
                let sample = if ch == 0 { value } else { -value };
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

#[test]
fn decodes_stereo_wav() {
    let bytes = wav_bytes(2, 44_100, 4_410, 16_384);
    let buffer = SymphoniaDecoder::new().decode_bytes("tone.wav", &bytes).unwrap();

    assert_eq!(buffer.sample_rate, 44_100);
    assert_eq!(buffer.frames(), 4_410);
    let (left, right) = buffer.frame(100).unwrap();
    assert!((left - 0.5).abs() < 1e-3);
    assert!((right + 0.5).abs() < 1e-3);
}

#[test]
fn mono_is_duplicated_to_both_channels() {
    let bytes = wav_bytes(1, 22_050, 1_000, 8_192);
    let buffer = SymphoniaDecoder::new().decode_bytes("mono.wav", &bytes).unwrap();

    assert_eq!(buffer.frames(), 1_000);
    let (left, right) = buffer.frame(10).unwrap();
    assert_eq!(left, right);
    assert!((left - 0.25).abs() < 1e-3);
}

#[test]
fn resamples_to_target_rate() {
    let bytes = wav_bytes(2, 44_100, 44_100, 1_000);
    let buffer = SymphoniaDecoder::with_target_rate(48_000)
        .decode_bytes("long.wav", &bytes)
        .unwrap();

    assert_eq!(buffer.sample_rate, 48_000);
    assert_eq!(buffer.frames(), 48_000);
    assert!((buffer.duration_secs() - 1.0).abs() < 1e-6);
}

#[test]
fn extension_hint_is_optional() {
    let bytes = wav_bytes(2, 48_000, 480, 100);
    let buffer = SymphoniaDecoder::new().decode_bytes("no-extension", &bytes).unwrap();
    assert_eq!(buffer.frames(), 480);
}

#[test]
fn truncated_header_is_not_audio() {
    let bytes = wav_bytes(2, 48_000, 480, 100);
    let err = SymphoniaDecoder::new()
        .decode_bytes("broken.wav", &bytes[..8])
        .unwrap_err();
    assert!(matches!(err, AudioError::UnsupportedFormat(_)));
}

#[test]
fn trait_object_maps_to_core_errors() {
    let decoder: Box<dyn AudioDecoder> = Box::new(SymphoniaDecoder::new());
    let err = decoder.decode("cover.jpg", &[0xFF, 0xD8, 0xFF, 0xE0]).unwrap_err();
    assert!(err.is_not_audio());
}
