//! Decoder settings for one Whisper pass.

use crate::config::SttConfig;

/// How Whisper picks tokens.
///
/// Commands are a word or two, so greedy decoding is the default: the reply
/// should start as soon as the user stops talking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoding {
    Greedy,
    /// Keep `width` hypotheses per step; slower, occasionally better on
    /// noisy outdoor audio.
    Beam { width: i32 },
}

/// Settings applied to every utterance.
///
/// ```
/// use garden_voice::stt::{Decoding, TranscribeParams};
///
/// let params = TranscribeParams {
///     initial_prompt: Some("เปิดระบบ เช็ค ความชื้น".into()),
///     ..TranscribeParams::default()
/// };
/// assert_eq!(params.language, "th");
/// assert_eq!(params.decoding, Decoding::Greedy);
/// ```
#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// ISO-639-1 code, or `"auto"` for Whisper's own detection.
    pub language: String,
    pub decoding: Decoding,
    /// Inference threads, at most 8.
    pub n_threads: i32,
    /// Decoder context; listing the command words makes Whisper spell them
    /// the way the keyword matcher expects.
    pub initial_prompt: Option<String>,
}

impl TranscribeParams {
    pub fn from_config(config: &SttConfig) -> Self {
        let decoding = match config.beam_size {
            Some(width) if width > 1 => Decoding::Beam { width },
            _ => Decoding::Greedy,
        };
        Self {
            language: config.language.clone(),
            decoding,
            ..Self::default()
        }
    }

    /// Attach a decoder prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.initial_prompt = Some(prompt.into());
        self
    }

    /// `None` when Whisper should detect the language itself.
    pub(crate) fn language_hint(&self) -> Option<&str> {
        (self.language != "auto").then_some(self.language.as_str())
    }
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            language: "th".into(),
            decoding: Decoding::Greedy,
            n_threads: inference_threads(),
            initial_prompt: None,
        }
    }
}

fn inference_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_without_beam_is_greedy() {
        let params = TranscribeParams::from_config(&SttConfig::default());
        assert_eq!(params.decoding, Decoding::Greedy);
        assert_eq!(params.language_hint(), Some("th"));
        assert!(params.initial_prompt.is_none());
    }

    #[test]
    fn beam_width_one_is_greedy() {
        let config = SttConfig {
            beam_size: Some(1),
            ..SttConfig::default()
        };
        assert_eq!(TranscribeParams::from_config(&config).decoding, Decoding::Greedy);

        let config = SttConfig {
            beam_size: Some(4),
            ..SttConfig::default()
        };
        assert_eq!(
            TranscribeParams::from_config(&config).decoding,
            Decoding::Beam { width: 4 }
        );
    }

    #[test]
    fn auto_language_has_no_hint() {
        let params = TranscribeParams {
            language: "auto".into(),
            ..TranscribeParams::default()
        };
        assert_eq!(params.language_hint(), None);
    }

    #[test]
    fn threads_are_capped() {
        let t = TranscribeParams::default().n_threads;
        assert!((1..=8).contains(&t));
    }

    #[test]
    fn prompt_is_attached() {
        let params = TranscribeParams::default().with_prompt("แสง ปุ๋ย");
        assert_eq!(params.initial_prompt.as_deref(), Some("แสง ปุ๋ย"));
    }
}
