//! Speech-to-text: Whisper behind the [`SttEngine`] seam.
//!
//! ```text
//! SttConfig.model ──resolve_model_path──▶ WhisperEngine::load
//!                                              │
//!   finished utterance (16 kHz mono f32) ──▶ transcribe() ──▶ text
//! ```
//!
//! ```rust,no_run
//! use garden_voice::config::{AppPaths, SttConfig};
//! use garden_voice::stt::{resolve_model_path, SttEngine, TranscribeParams, WhisperEngine};
//!
//! let config = SttConfig::default();
//! let path = resolve_model_path(&config.model, &AppPaths::new());
//! let engine = WhisperEngine::load(&path, TranscribeParams::from_config(&config))
//!     .expect("model not found");
//!
//! let audio: Vec<f32> = vec![0.0; 16_000]; // 1 s of silence
//! println!("{}", engine.transcribe(&audio).unwrap());
//! ```

pub mod engine;
pub mod model;
pub mod transcribe;

pub use engine::{
    strip_annotations, SttEngine, SttError, WhisperEngine, MAX_AUDIO_SAMPLES, MIN_AUDIO_SAMPLES,
};
pub use model::{find_model_by_id, resolve_model_path, ModelInfo, THAI_MODELS};
pub use transcribe::{Decoding, TranscribeParams};

#[cfg(test)]
pub use engine::MockSttEngine;
