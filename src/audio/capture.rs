//! Microphone input.
//!
//! The cpal callback forwards each hardware buffer as an [`AudioChunk`] on a
//! std channel. Buffers that arrive while the [`MicGate`] is closed are
//! dropped in the callback, so the garden's own replies are never heard by
//! the recogniser.

use std::sync::mpsc;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::gate::MicGate;

/// One hardware buffer, interleaved `f32` at the device's native format.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioChunk {
    /// Length of the chunk in seconds.
    pub fn duration_secs(&self) -> f32 {
        let frames = self.samples.len() / usize::from(self.channels.max(1));
        frames as f32 / self.sample_rate.max(1) as f32
    }
}

/// Keeps the input stream running; recording stops when it is dropped.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no matching input device on the default audio host")]
    NoDevice,

    #[error("could not list input devices: {0}")]
    Devices(String),

    #[error("input device has no usable default format: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("could not open input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("could not start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// An opened input device and the format it will record in.
///
/// ```rust,no_run
/// use std::sync::mpsc;
/// use garden_voice::audio::{AudioCapture, MicGate};
///
/// let (tx, rx) = mpsc::channel();
/// let capture = AudioCapture::open(None).unwrap();
/// let _recording = capture.start(tx, MicGate::shared()).unwrap();
/// # drop(rx);
/// ```
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
}

impl AudioCapture {
    /// Open the input device called `name`, or the host default.
    pub fn open(name: Option<&str>) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = match name {
            Some(wanted) => host
                .input_devices()
                .map_err(|e| CaptureError::Devices(e.to_string()))?
                .find(|d| d.name().is_ok_and(|n| n == wanted)),
            None => host.default_input_device(),
        }
        .ok_or(CaptureError::NoDevice)?;

        let config: cpal::StreamConfig = device.default_input_config()?.into();
        log::info!(
            "capture: {:?} at {} Hz, {} ch",
            device.name().unwrap_or_default(),
            config.sample_rate.0,
            config.channels
        );

        Ok(Self { device, config })
    }

    pub fn new() -> Result<Self, CaptureError> {
        Self::open(None)
    }

    /// Begin recording into `tx`. Chunks are only sent while `gate` is open;
    /// a dropped receiver is ignored.
    pub fn start(
        &self,
        tx: mpsc::Sender<AudioChunk>,
        gate: Arc<MicGate>,
    ) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.sample_rate();
        let channels = self.channels();

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if gate.is_open() {
                    let _ = tx.send(AudioChunk {
                        samples: data.to_vec(),
                        sample_rate,
                        channels,
                    });
                }
            },
            |err: cpal::StreamError| log::error!("capture: stream error: {err}"),
            None,
        )?;

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }
}
