//! The recogniser seam and its Whisper implementation.
//!
//! The transcriber thread hands one finished utterance (16 kHz mono `f32`)
//! to [`SttEngine::transcribe`] and gets the recognised text back, already
//! stripped of Whisper's non-speech markers.

use std::path::Path;
use std::time::Instant;

use thiserror::Error;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::stt::transcribe::{Decoding, TranscribeParams};

/// Why an utterance produced no text.
#[derive(Debug, Clone, Error)]
pub enum SttError {
    #[error("no Whisper model at {0}")]
    ModelNotFound(String),

    #[error("could not set up Whisper: {0}")]
    ContextInit(String),

    #[error("decoding failed: {0}")]
    Transcription(String),

    #[error("utterance shorter than 0.5 s (8000 samples)")]
    AudioTooShort,

    #[error("utterance longer than 60 s (960000 samples)")]
    AudioTooLong,
}

/// 0.5 s at 16 kHz. The transcriber pads anything shorter with silence.
pub const MIN_AUDIO_SAMPLES: usize = 8_000;
/// 60 s at 16 kHz.
pub const MAX_AUDIO_SAMPLES: usize = 960_000;

/// Turns one finished utterance into text.
///
/// `audio` is 16 kHz mono and between [`MIN_AUDIO_SAMPLES`] and
/// [`MAX_AUDIO_SAMPLES`] long; anything else is rejected with
/// [`SttError::AudioTooShort`] or [`SttError::AudioTooLong`]. Silence may
/// legitimately come back as an empty string.
pub trait SttEngine: Send + Sync {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError>;
}

fn check_length(audio: &[f32]) -> Result<(), SttError> {
    match audio.len() {
        n if n < MIN_AUDIO_SAMPLES => Err(SttError::AudioTooShort),
        n if n > MAX_AUDIO_SAMPLES => Err(SttError::AudioTooLong),
        _ => Ok(()),
    }
}

/// A loaded GGML model.
///
/// State is created per call, so the engine is shared behind an `Arc`
/// without a lock.
pub struct WhisperEngine {
    context: WhisperContext,
    params: TranscribeParams,
}

impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// SAFETY: the weights are read-only once loaded and every decode runs in its
// own WhisperState.
unsafe impl Send for WhisperEngine {}
unsafe impl Sync for WhisperEngine {}

impl WhisperEngine {
    pub fn load(model_path: impl AsRef<Path>, params: TranscribeParams) -> Result<Self, SttError> {
        let path = model_path.as_ref();
        let Some(path_str) = path.to_str().filter(|_| path.is_file()) else {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        };

        log::info!("stt: loading {path_str}");
        let context = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        Ok(Self { context, params })
    }

    pub fn params(&self) -> &TranscribeParams {
        &self.params
    }

    fn full_params(&self) -> FullParams<'_, '_> {
        let strategy = match self.params.decoding {
            Decoding::Greedy => SamplingStrategy::Greedy { best_of: 1 },
            Decoding::Beam { width } => SamplingStrategy::BeamSearch {
                beam_size: width,
                patience: -1.0,
            },
        };

        let mut fp = FullParams::new(strategy);
        fp.set_language(self.params.language_hint());
        fp.set_n_threads(self.params.n_threads);
        // One short command per call; nothing to carry over or split.
        fp.set_no_context(true);
        fp.set_single_segment(true);
        fp.set_print_special(false);
        fp.set_print_progress(false);
        fp.set_print_realtime(false);
        if let Some(prompt) = self.params.initial_prompt.as_deref() {
            fp.set_initial_prompt(prompt);
        }
        fp
    }
}

impl SttEngine for WhisperEngine {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        check_length(audio)?;
        let decode_err = |e: whisper_rs::WhisperError| SttError::Transcription(e.to_string());

        let started = Instant::now();
        let mut state = self
            .context
            .create_state()
            .map_err(|e| SttError::ContextInit(e.to_string()))?;
        state.full(self.full_params(), audio).map_err(decode_err)?;

        let text = (0..state.full_n_segments().map_err(decode_err)?)
            .map(|i| state.full_get_segment_text(i))
            .collect::<Result<String, _>>()
            .map_err(decode_err)?;

        log::debug!(
            "stt: {:.1} s of audio decoded in {} ms",
            audio.len() as f32 / 16_000.0,
            started.elapsed().as_millis()
        );
        Ok(strip_annotations(&text))
    }
}

/// Remove Whisper's non-speech annotations (`[BLANK_AUDIO]`, `(เสียงดนตรี)`,
/// `[Music]` …) and trim the result.
///
/// Background noise is regularly transcribed as such a marker; left in, a
/// marker could contain a command keyword by accident.
pub fn strip_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut marker = String::new();
    let mut closer: Option<char> = None;

    for c in text.chars() {
        match closer {
            Some(end) if c == end => {
                marker.clear();
                closer = None;
            }
            Some(_) => marker.push(c),
            None => match c {
                '[' => closer = Some(']'),
                '(' => closer = Some(')'),
                _ => out.push(c),
            },
        }
    }
    // An opener that never closes was not a marker; keep what followed it.
    out.push_str(&marker);

    out.trim().to_string()
}

/// Answers every utterance with a canned result, after the same length
/// check and marker stripping as the real engine.
#[cfg(test)]
pub struct MockSttEngine(Result<String, SttError>);

#[cfg(test)]
impl MockSttEngine {
    pub fn hearing(text: impl Into<String>) -> Self {
        Self(Ok(text.into()))
    }

    pub fn failing(error: SttError) -> Self {
        Self(Err(error))
    }
}

#[cfg(test)]
impl SttEngine for MockSttEngine {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        check_length(audio)?;
        self.0.as_ref().map(|text| strip_annotations(text)).map_err(Clone::clone)
    }
}
