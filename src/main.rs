//! Application entry point — garden voice assistant.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Connect the MQTT sensor feed and spawn its event loop.
//! 5. Load the Whisper model.
//! 6. Start the cpal capture stream behind the [`MicGate`].
//! 7. Spawn the transcriber thread.
//! 8. Run the [`DialogueController`] until the transcript stream ends or
//!    Ctrl-C is pressed.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use garden_voice::{
    audio::{AudioCapture, AudioChunk, MicGate},
    config::{AppConfig, AppPaths},
    dialogue::{vocab, DialogueController},
    feed::MqttFeed,
    listen::{spawn_transcriber, ChannelTranscripts, TranscriptEvent},
    sensors::SensorStore,
    speech::TtsSpeaker,
    stt::{resolve_model_path, SttEngine, TranscribeParams, WhisperEngine},
};

/// Finished transcripts waiting for the dialogue controller.
const TRANSCRIPT_QUEUE: usize = 8;

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("garden-voice starting up");

    // 2. Configuration
    let paths = AppPaths::new();
    let config = AppConfig::load_from(&paths.settings_file).unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e:#}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(run(config, paths))
}

async fn run(config: AppConfig, paths: AppPaths) -> anyhow::Result<()> {
    // 4. Sensor feed
    let sensors = SensorStore::shared();
    let (feed, publisher) = MqttFeed::connect(&config.feed);
    log::info!(
        "Connecting to MQTT broker {}:{}",
        config.feed.broker,
        config.feed.port
    );
    tokio::spawn(feed.run(Arc::clone(&sensors)));

    // 5. STT engine
    let model_path = resolve_model_path(&config.stt.model, &paths);
    let params = TranscribeParams::from_config(&config.stt).with_prompt(vocab::recognizer_prompt());
    let stt: Arc<dyn SttEngine> = Arc::new(
        WhisperEngine::load(&model_path, params)
            .with_context(|| format!("could not load Whisper model {}", model_path.display()))?,
    );
    log::info!("Whisper model loaded: {}", model_path.display());

    // 6. Audio capture
    let gate = MicGate::shared();
    let capture = AudioCapture::open(config.audio.input_device.as_deref())
        .context("audio capture unavailable")?;
    let (chunk_tx, chunk_rx) = std::sync::mpsc::channel::<AudioChunk>();
    let _stream = capture
        .start(chunk_tx, Arc::clone(&gate))
        .context("failed to start audio stream")?;
    log::info!(
        "Audio capture started ({} Hz, {} ch)",
        capture.sample_rate(),
        capture.channels()
    );

    // 7. Transcriber thread
    let (event_tx, event_rx) = mpsc::channel::<TranscriptEvent>(TRANSCRIPT_QUEUE);
    let _transcriber = spawn_transcriber(chunk_rx, Arc::clone(&gate), stt, &config.audio, event_tx)
        .context("failed to spawn transcriber thread")?;

    // 8. Dialogue
    let speech = Arc::new(TtsSpeaker::from_config(&config.tts, &config.audio));
    let mut controller = DialogueController::new(sensors, speech, gate, Arc::new(publisher))
        .with_language(config.tts.language.clone())
        .with_target_topic(config.feed.topics.moisture_target.clone())
        .with_config(&config.dialogue);
    let mut transcripts = ChannelTranscripts::new(event_rx);

    log::info!("Listening for the wake phrase");
    tokio::select! {
        _ = controller.run(&mut transcripts) => {}
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                log::warn!("Ctrl-C handler failed: {e}");
            }
            log::info!("Shutting down");
        }
    }

    Ok(())
}
