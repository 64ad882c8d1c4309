//! Audio I/O — microphone capture, capture gating, endpointing helpers and
//! speaker playback.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback ─(MicGate open?)─▶ AudioChunk (mpsc)
//!           → stereo_to_mono → resample (16 kHz) → VadDetector / PreRoll
//!
//! MP3 bytes → decode_mp3 → resample → cpal output (blocking)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::mpsc;
//! use garden_voice::audio::{AudioCapture, AudioChunk, CaptureGate, MicGate};
//!
//! let (tx, rx) = mpsc::channel::<AudioChunk>();
//! let gate = MicGate::shared();
//! let capture = AudioCapture::new().unwrap();
//! let _handle = capture.start(tx, gate.clone()).unwrap();
//!
//! gate.pause(); // the callback now drops every buffer
//! gate.resume();
//! ```

pub mod buffer;
pub mod capture;
pub mod gate;
pub mod playback;
pub mod resample;
pub mod vad;

pub use buffer::PreRoll;
pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use gate::{pause_capture, CaptureGate, MicGate, PauseGuard};
pub use playback::{decode_mp3, AudioPlayer, DecodedAudio, PlaybackError};
pub use resample::{resample, stereo_to_mono};
pub use vad::VadDetector;
