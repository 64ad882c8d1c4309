//! Google Translate TTS client.
//!
//! The endpoint accepts at most ~100 characters per request and answers
//! with an MP3 clip.  Longer replies are split and the clips concatenated;
//! MP3 frames are self-delimiting so the joined bytes decode as one stream.

use std::time::Duration;

use crate::config::TtsConfig;
use crate::speech::SpeechError;

/// Longest text sent in a single request, in characters.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Breaks at whitespace where possible; a run longer than `max_chars`
/// without whitespace (common in Thai) is cut hard.  Pieces are trimmed and
/// never empty.
///
/// ```
/// use garden_voice::speech::split_for_tts;
///
/// assert_eq!(split_for_tts("ab cd ef", 5), vec!["ab cd", "ef"]);
/// assert!(split_for_tts("   ", 5).is_empty());
/// ```
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_inclusive(char::is_whitespace) {
        let word_len = word.trim_end().chars().count();
        if current_len + word_len > max_chars {
            flush(&mut current, &mut chunks);
            current_len = 0;
        }

        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                current.extend(piece);
                current_len = piece.len();
                if current_len == max_chars {
                    flush(&mut current, &mut chunks);
                    current_len = 0;
                }
            }
        } else {
            current.push_str(word);
            current_len += word.chars().count();
        }
    }
    flush(&mut current, &mut chunks);

    chunks
}

fn flush(current: &mut String, chunks: &mut Vec<String>) {
    let piece = current.trim();
    if !piece.is_empty() {
        chunks.push(piece.to_string());
    }
    current.clear();
}

/// Reject responses that declare a non-audio body, such as the HTML page the
/// endpoint serves with a 200 when it rate-limits. A missing header is left
/// for the MP3 decoder to judge.
fn ensure_audio(content_type: Option<&str>) -> Result<(), SpeechError> {
    match content_type {
        Some(ct) if !ct.trim_start().to_ascii_lowercase().starts_with("audio/") => Err(
            SpeechError::Synthesis(format!("expected audio, got {ct:?}")),
        ),
        _ => Ok(()),
    }
}

/// HTTP client for the Translate TTS endpoint.
pub struct GoogleTts {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTts {
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`.
    pub fn from_config(config: &TtsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.clone(),
        }
    }

    /// Synthesise `text`, returning the concatenated MP3 bytes.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError> {
        let chunks = split_for_tts(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SpeechError::Synthesis("nothing to synthesise".into()));
        }

        let total = chunks.len();
        let mut mp3 = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let response = self
                .request(chunk, language, idx, total)
                .send()
                .await?
                .error_for_status()?;
            ensure_audio(
                response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok()),
            )?;
            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Err(SpeechError::Synthesis(format!(
                    "empty audio for chunk {}/{total}",
                    idx + 1
                )));
            }
            mp3.extend_from_slice(&bytes);
        }

        log::debug!("speech: synthesised {} bytes in {total} request(s)", mp3.len());
        Ok(mp3)
    }

    fn request(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> reqwest::RequestBuilder {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();
        self.client.get(&self.base_url).query(&[
            ("ie", "UTF-8"),
            ("client", "tw-ob"),
            ("tl", language),
            ("q", chunk),
            ("idx", idx.as_str()),
            ("total", total.as_str()),
            ("textlen", textlen.as_str()),
        ])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
