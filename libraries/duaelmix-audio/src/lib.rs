//! Duaelmix Audio
//!
//! Audio building blocks for the dual-track player:
//! - **Decoding**: `SymphoniaDecoder` turns an encoded file held in memory into
//!   an interleaved stereo `AudioBuffer`, resampled to the playback rate
//! - **Filters**: stereo biquad filters (the all-pass and high-pass used in
//!   single-track mode)
//! - **Analysis**: a frequency analyser producing byte spectra and an
//!   A-weighted loudness level
//! - **Output** (feature `desktop`): a CPAL output stream pulling frames from a
//!   render callback
//!
//! # Example
//!
//! ```rust
//! use duaelmix_audio::{FrequencyAnalyser, StereoFilter};
//!
//! let mut filter = StereoFilter::high_pass(48_000, 2_000.0).unwrap();
//! let (l, r) = filter.process(0.5, 0.5);
//! assert!(l.is_finite() && r.is_finite());
//!
//! let mut analyser = FrequencyAnalyser::new(48_000, 1024, 0.5).unwrap();
//! assert_eq!(analyser.level(), 0.0);
//! ```

pub mod analyser;
pub mod decoder;
pub mod error;
pub mod filter;
#[cfg(feature = "desktop")]
pub mod output;
pub mod resampling;

pub use analyser::{a_weighting, validate_fft_size, FrequencyAnalyser};
pub use decoder::SymphoniaDecoder;
pub use error::{AudioError, Result};
pub use filter::{FilterKind, StereoFilter};
#[cfg(feature = "desktop")]
pub use output::{CpalOutput, RenderCallback};
pub use resampling::resample;
