//! [`TtsSpeaker`] — the production [`SpeechSink`].

use std::path::PathBuf;

use async_trait::async_trait;

use crate::audio::{decode_mp3, AudioPlayer, PlaybackError};
use crate::config::{AudioConfig, TtsConfig};
use crate::speech::google::GoogleTts;
use crate::speech::{SpeechError, SpeechSink};

/// Synthesises with [`GoogleTts`] and plays through [`AudioPlayer`].
pub struct TtsSpeaker {
    tts: GoogleTts,
    player: AudioPlayer,
    artifact_path: Option<PathBuf>,
}

impl TtsSpeaker {
    pub fn new(tts: GoogleTts, player: AudioPlayer, artifact_path: Option<PathBuf>) -> Self {
        Self {
            tts,
            player,
            artifact_path,
        }
    }

    pub fn from_config(tts: &TtsConfig, audio: &AudioConfig) -> Self {
        Self::new(
            GoogleTts::from_config(tts),
            AudioPlayer::new(audio.output_device.clone()),
            tts.artifact_path.clone(),
        )
    }

    async fn keep_artifact(&self, mp3: &[u8]) {
        let Some(path) = &self.artifact_path else {
            return;
        };
        if let Err(e) = tokio::fs::write(path, mp3).await {
            log::warn!("speech: could not write {}: {e}", path.display());
        }
    }

    /// Decode `mp3` and play it to completion. Bytes that hold no audio fail
    /// here, before any output device is opened.
    async fn play_reply(&self, mp3: &[u8]) -> Result<(), SpeechError> {
        let clip = decode_mp3(mp3)?;

        // cpal playback blocks until the buffer drains.
        let player = self.player.clone();
        tokio::task::spawn_blocking(move || player.play(&clip))
            .await
            .map_err(|e| PlaybackError::Stream(format!("playback task failed: {e}")))??;
        Ok(())
    }
}

#[async_trait]
impl SpeechSink for TtsSpeaker {
    async fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError> {
        let mp3 = self.tts.synthesize(text, language).await?;
        self.keep_artifact(&mp3).await;
        self.play_reply(&mp3).await?;

        log::debug!("speech: finished speaking {} chars", text.chars().count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_takes_artifact_path() {
        let tts = TtsConfig {
            artifact_path: Some(PathBuf::from("/tmp/response.mp3")),
            ..TtsConfig::default()
        };
        let speaker = TtsSpeaker::from_config(&tts, &AudioConfig::default());
        assert_eq!(
            speaker.artifact_path.as_deref(),
            Some(std::path::Path::new("/tmp/response.mp3"))
        );
    }

    #[tokio::test]
    async fn artifact_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.mp3");
        let speaker = TtsSpeaker::new(
            GoogleTts::from_config(&TtsConfig::default()),
            AudioPlayer::default(),
            Some(path.clone()),
        );

        speaker.keep_artifact(b"ID3").await;
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3");
    }

    #[tokio::test]
    async fn non_audio_body_fails_without_opening_a_device() {
        let speaker = TtsSpeaker::new(
            GoogleTts::from_config(&TtsConfig::default()),
            AudioPlayer::new(Some("no such speaker".into())),
            None,
        );
        let page = b"<html><body>Our systems have detected unusual traffic</body></html>";

        let err = speaker.play_reply(page).await.unwrap_err();
        assert!(matches!(err, SpeechError::Playback(PlaybackError::Decode(_))));
    }

    #[tokio::test]
    async fn blank_reply_fails_before_playback() {
        let speaker = TtsSpeaker::from_config(&TtsConfig::default(), &AudioConfig::default());
        let err = speaker.speak("", "th").await.unwrap_err();
        assert!(matches!(err, SpeechError::Synthesis(_)));
    }
}
