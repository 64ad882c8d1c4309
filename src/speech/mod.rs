//! Speech output sink — text in, audible reply out.
//!
//! [`SpeechSink::speak`] returns only after playback has finished (or
//! failed), which is what lets the dialogue controller keep the microphone
//! closed for exactly the length of a reply.
//!
//! ```text
//! text ──GoogleTts (≤100-char requests)──▶ MP3 bytes
//!      ──[optional artifact file]──▶ decode_mp3 ──▶ AudioPlayer::play (blocking)
//! ```

pub mod google;
pub mod speaker;

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::PlaybackError;

pub use google::{split_for_tts, GoogleTts, MAX_CHUNK_CHARS};
pub use speaker::TtsSpeaker;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SpeechError {
    /// The synthesiser could not produce audio.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// Audio was produced but could not be played.
    #[error("speech playback failed: {0}")]
    Playback(#[from] PlaybackError),
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpeechError::Synthesis("request timed out".into())
        } else {
            SpeechError::Synthesis(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechSink
// ---------------------------------------------------------------------------

/// Synthesise `text` in `language` and play it to completion.
#[async_trait]
pub trait SpeechSink: Send + Sync {
    async fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError>;
}

// Compile-time assertion: Arc<dyn SpeechSink> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: std::sync::Arc<dyn SpeechSink>) {}
};
