//! Blocking speaker playback via `cpal`.
//!
//! [`decode_mp3`] turns an MP3 clip into mono samples with `minimp3`.
//! [`AudioPlayer::play`] resamples them to the output device's native rate
//! and returns only after the cpal callback has consumed the last sample.
//! Call it from a blocking context (`tokio::task::spawn_blocking`), never
//! directly on an async worker.

use std::io::Cursor;
use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::resample::{resample, stereo_to_mono};

/// Extra time allowed past the clip length before playback counts as stalled.
const STALL_MARGIN: Duration = Duration::from_secs(3);

/// Lets the device drain its own hardware buffer after our last sample.
const TAIL_FLUSH: Duration = Duration::from_millis(150);

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors raised while decoding or playing audio.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no matching output device on the default audio host")]
    NoDevice,

    #[error("failed to enumerate output devices: {0}")]
    Devices(String),

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("output stream error: {0}")]
    Stream(String),

    #[error("playback did not finish within {0:?}")]
    Stalled(Duration),

    #[error("MP3 decode error: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// DecodedAudio
// ---------------------------------------------------------------------------

/// Mono PCM clip in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Decode a whole MP3 clip to mono `f32`.
///
/// Frames are downmixed as they are read.  Input holding no MP3 frames at
/// all (an empty body, an HTML error page) is a [`PlaybackError::Decode`],
/// so a successful decode always has something to play.
pub fn decode_mp3(mp3: &[u8]) -> Result<DecodedAudio, PlaybackError> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3));
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                sample_rate = frame.sample_rate.max(0) as u32;
                let pcm: Vec<f32> = frame.data.iter().map(|&s| f32::from(s) / 32768.0).collect();
                samples.extend(stereo_to_mono(&pcm, frame.channels as u16));
            }
            Err(minimp3::Error::Eof) => break,
            // ID3 tags and other junk between frames.
            Err(minimp3::Error::SkippedData) => continue,
            Err(e) => return Err(PlaybackError::Decode(e.to_string())),
        }
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(PlaybackError::Decode(format!(
            "no MP3 frames in {} bytes",
            mp3.len()
        )));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

// ---------------------------------------------------------------------------
// AudioPlayer
// ---------------------------------------------------------------------------

/// Plays clips on the configured output device.
///
/// The device is opened per clip, so a speaker that is unplugged and
/// plugged back in between replies keeps working.
#[derive(Debug, Clone, Default)]
pub struct AudioPlayer {
    device_name: Option<String>,
}

impl AudioPlayer {
    /// Player for the output device called `device_name`, or the system
    /// default when `None`.
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }

    /// Play `clip` and block until the device has consumed all of it.
    pub fn play(&self, clip: &DecodedAudio) -> Result<(), PlaybackError> {
        if clip.samples.is_empty() {
            return Ok(());
        }

        let device = self.open_device()?;
        let supported = device.default_output_config()?;
        let config: cpal::StreamConfig = supported.into();
        let channels = config.channels.max(1) as usize;
        let device_rate = config.sample_rate.0;

        let samples = resample(&clip.samples, clip.sample_rate, device_rate);
        let total = samples.len();
        let mut pos = 0usize;

        let (done_tx, done_rx) = mpsc::sync_channel::<Result<(), String>>(1);
        let err_tx = done_tx.clone();
        let mut signalled = false;

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = samples.get(pos).copied().unwrap_or(0.0);
                    frame.fill(sample);
                    pos = (pos + 1).min(total);
                }
                if pos == total && !signalled {
                    signalled = true;
                    let _ = done_tx.try_send(Ok(()));
                }
            },
            move |err: cpal::StreamError| {
                log::error!("playback: cpal stream error: {err}");
                let _ = err_tx.try_send(Err(err.to_string()));
            },
            None,
        )?;

        stream.play()?;

        let limit = clip.duration() + STALL_MARGIN;
        let outcome = match done_rx.recv_timeout(limit) {
            Ok(Ok(())) => {
                std::thread::sleep(TAIL_FLUSH);
                Ok(())
            }
            Ok(Err(msg)) => Err(PlaybackError::Stream(msg)),
            Err(_) => Err(PlaybackError::Stalled(limit)),
        };

        drop(stream);
        log::debug!("playback: {total} samples @ {device_rate} Hz finished: {outcome:?}");
        outcome
    }

    fn open_device(&self) -> Result<cpal::Device, PlaybackError> {
        let host = cpal::default_host();
        match &self.device_name {
            Some(wanted) => host
                .output_devices()
                .map_err(|e| PlaybackError::Devices(e.to_string()))?
                .find(|d| d.name().is_ok_and(|n| &n == wanted))
                .ok_or(PlaybackError::NoDevice),
            None => host.default_output_device().ok_or(PlaybackError::NoDevice),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
