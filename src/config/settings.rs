//! `settings.toml` sections and their defaults.
//!
//! Every section is `#[serde(default)]`, so a file only lists what it
//! overrides; the defaults talk to the public mosquitto broker.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Topic names on the sensor feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Inbound light-intensity readings (lumen).
    pub light: String,
    /// Inbound soil-moisture readings (percent).
    pub moisture: String,
    /// Inbound N, P and K readings.
    pub nitrogen: String,
    pub phosphorus: String,
    pub potassium: String,
    /// Outbound target-moisture command.
    pub moisture_target: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            light: "sensor/light".into(),
            moisture: "sensor/moisture".into(),
            nitrogen: "sensor/nitrogen".into(),
            phosphorus: "sensor/phosphorus".into(),
            potassium: "sensor/potassium".into(),
            moisture_target: "sensor/moisture-target".into(),
        }
    }
}

/// MQTT broker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
    /// Pause between reconnect attempts after a connection error.
    pub reconnect_delay_secs: u64,
    pub topics: TopicConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            broker: "test.mosquitto.org".into(),
            port: 1883,
            client_id: "garden-voice".into(),
            keep_alive_secs: 60,
            reconnect_delay_secs: 5,
            topics: TopicConfig::default(),
        }
    }
}

/// Settings for the Whisper STT engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Model id from [`crate::stt::THAI_MODELS`] or an explicit `.bin` path.
    pub model: String,
    /// Speech language as an ISO-639-1 code.
    pub language: String,
    /// Beam width; `None` decodes greedily.
    pub beam_size: Option<i32>,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "thonburian-medium".into(),
            language: "th".into(),
            beam_size: None,
        }
    }
}

/// Settings for audio capture and utterance endpointing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Analysis sample rate in Hz (Whisper requires 16 000).
    pub sample_rate: u32,
    /// Samples per analysis frame (4 000 = 250 ms at 16 kHz).
    pub frame_size: usize,
    /// RMS amplitude above which a frame counts as speech.
    pub vad_threshold: f32,
    /// Consecutive silent frames after speech that end an utterance.
    pub end_silence_frames: usize,
    /// Utterances are force-finalised once they reach this length.
    pub max_utterance_secs: f32,
    /// Microphone name — `None` means the system default.
    pub input_device: Option<String>,
    /// Speaker name — `None` means the system default.
    pub output_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            frame_size: 4_000,
            vad_threshold: 0.01,
            end_silence_frames: 3,
            max_utterance_secs: 15.0,
            input_device: None,
            output_device: None,
        }
    }
}

/// Settings for speech synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Language tag handed to the synthesiser.
    pub language: String,
    /// Translate-TTS endpoint.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// When set, the last synthesised MP3 is also written here.
    pub artifact_path: Option<PathBuf>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            language: "th".into(),
            base_url: "https://translate.google.com/translate_tts".into(),
            timeout_secs: 10,
            artifact_path: None,
        }
    }
}

/// Dialogue behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Seconds a non-idle state may wait for its answer before falling back
    /// to idle.  `None` waits forever.
    pub idle_timeout_secs: Option<u64>,
}

/// Everything in `settings.toml`. Each section may be omitted.
///
/// ```rust,no_run
/// use garden_voice::config::AppConfig;
///
/// let config = AppConfig::load().unwrap();
/// println!("broker = {}", config.feed.broker);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub stt: SttConfig,
    pub audio: AudioConfig,
    pub tts: TtsConfig,
    pub dialogue: DialogueConfig,
}

impl AppConfig {
    /// Read the settings file from [`AppPaths`]; a missing file means defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Write every value, defaults included, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
