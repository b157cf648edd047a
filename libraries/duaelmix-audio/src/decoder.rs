/// Symphonia-based decoder for files held in memory
use crate::error::{AudioError, Result};
use crate::resampling::resample;
use duaelmix_core::{AudioBuffer, AudioDecoder};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// ITU-R BS.775-1 coefficient for center and surround channels (-3 dB)
const CENTER_MIX: f32 = 0.707;

/// Decodes complete files into interleaved stereo buffers
///
/// Supports every format enabled in the symphonia build (MP3, FLAC, OGG
/// Vorbis, WAV, AAC/M4A). Multi-channel sources are downmixed to stereo.
/// When a target rate is set, the decoded audio is resampled so every
/// buffer handed to the engine shares the output device's rate.
#[derive(Debug, Clone, Default)]
pub struct SymphoniaDecoder {
    target_sample_rate: Option<u32>,
}

impl SymphoniaDecoder {
    /// Decoder that keeps each file's native sample rate
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that resamples everything to `sample_rate`
    pub fn with_target_rate(sample_rate: u32) -> Self {
        Self {
            target_sample_rate: Some(sample_rate),
        }
    }

    /// The rate decoded buffers are resampled to, if any
    pub fn target_sample_rate(&self) -> Option<u32> {
        self.target_sample_rate
    }

    /// Decode `bytes`, using `name`'s extension as a format hint
    pub fn decode_bytes(&self, name: &str, bytes: &[u8]) -> Result<AudioBuffer> {
        let mut hint = Hint::new();
        if let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let source = Box::new(Cursor::new(bytes.to_vec()));
        let mss = MediaSourceStream::new(source, Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::UnsupportedFormat(format!("{name}: {e}")))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::UnsupportedFormat(format!("{name}: no audio track")))?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::UnsupportedFormat(format!("{name}: {e}")))?;

        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(AudioError::Symphonia(format!("reading packet: {e}"))),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    sample_rate.get_or_insert(decoded.spec().rate);
                    append_stereo(decoded, &mut samples);
                }
                // Corrupt packets are skipped, the stream may recover
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::debug!("Skipping undecodable packet in {}: {}", name, e);
                }
                Err(e) => return Err(AudioError::DecodeError(format!("{name}: {e}"))),
            }
        }

        let sample_rate = sample_rate
            .filter(|rate| *rate > 0)
            .ok_or_else(|| AudioError::UnsupportedFormat(format!("{name}: unknown sample rate")))?;

        if samples.is_empty() {
            return Err(AudioError::UnsupportedFormat(format!(
                "{name}: no audio frames"
            )));
        }

        match self.target_sample_rate {
            Some(target) if target != sample_rate => {
                tracing::debug!("Resampling {} from {} Hz to {} Hz", name, sample_rate, target);
                let resampled = resample(&samples, sample_rate, target)?;
                Ok(AudioBuffer::new(resampled, target))
            }
            _ => Ok(AudioBuffer::new(samples, sample_rate)),
        }
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, name: &str, bytes: &[u8]) -> duaelmix_core::Result<AudioBuffer> {
        Ok(self.decode_bytes(name, bytes)?)
    }
}

/// Append a decoded packet to `out` as interleaved stereo f32
///
/// Signed integers use symmetric scaling (divide by 2^(N-1)) so the range
/// stays symmetric around zero.
fn append_stereo(decoded: AudioBufferRef<'_>, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => downmix(&buf, out, |s| s.clamp(-1.0, 1.0)),
        AudioBufferRef::F64(buf) => downmix(&buf, out, |s| (s as f32).clamp(-1.0, 1.0)),
        AudioBufferRef::S32(buf) => downmix(&buf, out, |s| s as f32 / 2147483648.0),
        AudioBufferRef::S24(buf) => downmix(&buf, out, |s| s.inner() as f32 / 8388608.0),
        AudioBufferRef::S16(buf) => downmix(&buf, out, |s| f32::from(s) / 32768.0),
        AudioBufferRef::S8(buf) => downmix(&buf, out, |s| f32::from(s) / 128.0),
        AudioBufferRef::U32(buf) => {
            downmix(&buf, out, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0);
        }
        AudioBufferRef::U24(buf) => {
            downmix(&buf, out, |s| (s.inner() as f32 / 16777215.0) * 2.0 - 1.0);
        }
        AudioBufferRef::U16(buf) => {
            downmix(&buf, out, |s| (f32::from(s) / f32::from(u16::MAX)) * 2.0 - 1.0);
        }
        AudioBufferRef::U8(buf) => {
            downmix(&buf, out, |s| (f32::from(s) / f32::from(u8::MAX)) * 2.0 - 1.0);
        }
    }
}

/// Downmix any channel layout to stereo
///
/// Layouts follow the usual WAV/FLAC ordering:
/// - 1: mono, duplicated to both sides
/// - 2: L, R
/// - 3: L, R, C
/// - 4: L, R, SL, SR
/// - 5: L, R, C, SL, SR
/// - 6+: L, R, C, LFE, SL, SR (extra channels ignored)
fn downmix<T, F>(buf: &symphonia::core::audio::AudioBuffer<T>, out: &mut Vec<f32>, normalize: F)
where
    T: Sample + Copy,
    F: Fn(T) -> f32,
{
    let frames = buf.frames();
    let channels = buf.spec().channels.count();
    out.reserve(frames * 2);

    // (channel, left weight, right weight)
    let weights: &[(usize, f32, f32)] = match channels {
        0 => {
            out.resize(out.len() + frames * 2, 0.0);
            return;
        }
        1 => &[(0, 1.0, 1.0)],
        2 => &[(0, 1.0, 0.0), (1, 0.0, 1.0)],
        3 => &[(0, 1.0, 0.0), (1, 0.0, 1.0), (2, CENTER_MIX, CENTER_MIX)],
        4 => &[
            (0, 1.0, 0.0),
            (1, 0.0, 1.0),
            (2, CENTER_MIX, 0.0),
            (3, 0.0, CENTER_MIX),
        ],
        5 => &[
            (0, 1.0, 0.0),
            (1, 0.0, 1.0),
            (2, CENTER_MIX, CENTER_MIX),
            (3, CENTER_MIX, 0.0),
            (4, 0.0, CENTER_MIX),
        ],
        _ => &[
            (0, 1.0, 0.0),
            (1, 0.0, 1.0),
            (2, CENTER_MIX, CENTER_MIX),
            (3, CENTER_MIX, CENTER_MIX),
            (4, CENTER_MIX, 0.0),
            (5, 0.0, CENTER_MIX),
        ],
    };

    for frame in 0..frames {
        let (mut left, mut right) = (0.0_f32, 0.0_f32);
        for &(ch, to_left, to_right) in weights {
            let sample = normalize(buf.chan(ch)[frame]);
            left += sample * to_left;
            right += sample * to_right;
        }
        out.push(left.clamp(-1.0, 1.0));
        out.push(right.clamp(-1.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_not_audio() {
        let decoder = SymphoniaDecoder::new();
        let err = decoder
            .decode_bytes("notes.txt", b"definitely not a sound file")
            .unwrap_err();
        assert!(matches!(err, AudioError::UnsupportedFormat(_)));
    }

    #[test]
    fn empty_bytes_are_not_audio() {
        let decoder = SymphoniaDecoder::new();
        let err = decoder.decode("empty.mp3", &[]).unwrap_err();
        assert!(err.is_not_audio());
    }

    #[test]
    fn target_rate_is_reported() {
        assert_eq!(SymphoniaDecoder::new().target_sample_rate(), None);
        assert_eq!(
            SymphoniaDecoder::with_target_rate(48_000).target_sample_rate(),
            Some(48_000)
        );
    }
}
