/// CPAL-based audio output
///
/// The stream is owned by a dedicated audio thread, the handle talks to it
/// over a channel. This sidesteps `cpal::Stream` not being `Send` on every
/// platform.
use crate::error::{AudioError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use duaelmix_core::types::CHANNELS;
use std::thread::{self, JoinHandle};

/// Fills an interleaved stereo buffer; runs on the real-time audio thread
pub type RenderCallback = Box<dyn FnMut(&mut [f32]) + Send + 'static>;

/// Commands sent to the audio thread
enum OutputCommand {
    Pause,
    Resume,
    Shutdown,
}

/// Audio output on the default device
pub struct CpalOutput {
    command_tx: Sender<OutputCommand>,
    sample_rate: u32,
    audio_thread: Option<JoinHandle<()>>,
}

impl CpalOutput {
    /// Open the default output device and start pulling frames from `render`
    ///
    /// # Errors
    /// Returns `DeviceNotFound` when there is no output device and `Stream`
    /// when the device refuses the stream.
    pub fn new(render: RenderCallback) -> Result<Self> {
        let device = Self::default_device()?;
        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceNotFound(e.to_string()))?;
        let sample_rate = supported.sample_rate();
        let config = supported.config();

        let (command_tx, command_rx) = bounded::<OutputCommand>(8);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let audio_thread = thread::Builder::new()
            .name("duaelmix-audio".into())
            .spawn(move || Self::audio_thread_run(&device, &config, render, &command_rx, &ready_tx))?;

        ready_rx
            .recv()
            .map_err(|_| AudioError::Stream("audio thread exited during startup".into()))??;

        tracing::info!("Audio output started at {} Hz", sample_rate);

        Ok(Self {
            command_tx,
            sample_rate,
            audio_thread: Some(audio_thread),
        })
    }

    /// Output device sample rate; decoders should resample to it
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sample rate the default device would open at, without opening it
    pub fn default_sample_rate() -> Result<u32> {
        let supported = Self::default_device()?
            .default_output_config()
            .map_err(|e| AudioError::DeviceNotFound(e.to_string()))?;
        Ok(supported.sample_rate())
    }

    fn default_device() -> Result<Device> {
        cpal::default_host()
            .default_output_device()
            .ok_or_else(|| AudioError::DeviceNotFound("no default output device".into()))
    }

    /// Pause the device stream
    pub fn pause(&self) {
        let _ = self.command_tx.send(OutputCommand::Pause);
    }

    /// Resume the device stream
    pub fn resume(&self) {
        let _ = self.command_tx.send(OutputCommand::Resume);
    }

    fn audio_thread_run(
        device: &Device,
        config: &StreamConfig,
        mut render: RenderCallback,
        command_rx: &Receiver<OutputCommand>,
        ready_tx: &Sender<Result<()>>,
    ) {
        let device_channels = usize::from(config.channels);
        let mut stereo = Vec::new();

        let stream = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / device_channels;
                stereo.resize(frames * CHANNELS, 0.0);
                render(&mut stereo);
                map_channels(&stereo, data, device_channels);
            },
            |err| tracing::error!("Audio stream error: {}", err),
            None,
        );

        let stream: Stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready_tx.send(Err(AudioError::Stream(e.to_string())));
                return;
            }
        };
        if let Err(e) = stream.play() {
            let _ = ready_tx.send(Err(AudioError::Stream(e.to_string())));
            return;
        }
        let _ = ready_tx.send(Ok(()));

        while let Ok(command) = command_rx.recv() {
            match command {
                OutputCommand::Pause => {
                    if let Err(e) = stream.pause() {
                        tracing::warn!("Failed to pause stream: {}", e);
                    }
                }
                OutputCommand::Resume => {
                    if let Err(e) = stream.play() {
                        tracing::warn!("Failed to resume stream: {}", e);
                    }
                }
                OutputCommand::Shutdown => break,
            }
        }
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        let _ = self.command_tx.send(OutputCommand::Shutdown);
        if let Some(handle) = self.audio_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Spread interleaved stereo onto a device with `channels` channels
///
/// Mono devices get the average, extra channels beyond two stay silent.
fn map_channels(stereo: &[f32], out: &mut [f32], channels: usize) {
    if channels == 0 {
        return;
    }
    for (frame, chunk) in stereo.chunks_exact(CHANNELS).zip(out.chunks_mut(channels)) {
        match chunk {
            [mono] => *mono = (frame[0] + frame[1]) * 0.5,
            [left, right, rest @ ..] => {
                *left = frame[0];
                *right = frame[1];
                rest.fill(0.0);
            }
            [] => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_passes_through() {
        let mut out = [0.0; 4];
        map_channels(&[0.1, 0.2, 0.3, 0.4], &mut out, 2);
        assert_eq!(out, [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn mono_device_gets_average() {
        let mut out = [0.0; 2];
        map_channels(&[0.2, 0.4, -1.0, 1.0], &mut out, 1);
        assert!((out[0] - 0.3).abs() < 1e-6);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn surround_device_silences_extra_channels() {
        let mut out = [9.0; 6];
        map_channels(&[0.5, -0.5], &mut out, 6);
        assert_eq!(out, [0.5, -0.5, 0.0, 0.0, 0.0, 0.0]);
    }
}
