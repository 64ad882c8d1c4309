//! The transcriber thread: raw capture chunks in, [`TranscriptEvent`]s out.
//!
//! Whisper inference is CPU-bound and blocking, so it runs on a dedicated OS
//! thread rather than on the tokio runtime.  Events are handed to the async
//! side with `blocking_send`.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::Sender;

use crate::audio::{resample, stereo_to_mono, AudioChunk, MicGate};
use crate::config::AudioConfig;
use crate::listen::segmenter::UtteranceSegmenter;
use crate::listen::transcript::TranscriptEvent;
use crate::stt::{SttEngine, MAX_AUDIO_SAMPLES, MIN_AUDIO_SAMPLES};

/// Per-thread state: segmentation plus recognition.
pub struct Transcriber {
    stt: Arc<dyn SttEngine>,
    segmenter: UtteranceSegmenter,
    sample_rate: u32,
    seen_epoch: u64,
}

impl Transcriber {
    pub fn new(stt: Arc<dyn SttEngine>, config: &AudioConfig) -> Self {
        Self {
            stt,
            segmenter: UtteranceSegmenter::from_config(config),
            sample_rate: config.sample_rate,
            seen_epoch: 0,
        }
    }

    /// Process one capture chunk under the gate's current state.
    ///
    /// Audio that straddles a pause is discarded: a change of gate epoch
    /// resets the segmenter before the chunk is looked at, and chunks
    /// arriving while the gate is closed are dropped.
    pub fn process(&mut self, chunk: &AudioChunk, gate: &MicGate) -> Vec<TranscriptEvent> {
        let epoch = gate.epoch();
        if epoch != self.seen_epoch {
            log::debug!("listen: capture gate cycled, dropping partial utterance");
            self.segmenter.reset();
            self.seen_epoch = epoch;
        }
        if !gate.is_open() {
            return Vec::new();
        }
        log::trace!("listen: {:.3} s chunk", chunk.duration_secs());

        let mono = stereo_to_mono(&chunk.samples, chunk.channels);
        let audio = resample(&mono, chunk.sample_rate, self.sample_rate);

        self.segmenter
            .push(&audio)
            .into_iter()
            .filter_map(|utterance| self.recognise(utterance))
            .collect()
    }

    fn recognise(&self, mut utterance: Vec<f32>) -> Option<TranscriptEvent> {
        utterance.truncate(MAX_AUDIO_SAMPLES);
        if utterance.len() < MIN_AUDIO_SAMPLES {
            utterance.resize(MIN_AUDIO_SAMPLES, 0.0);
        }

        let secs = utterance.len() as f32 / self.sample_rate.max(1) as f32;
        log::debug!("listen: transcribing {secs:.2} s utterance");

        match self.stt.transcribe(&utterance) {
            Ok(text) => {
                match TranscriptEvent::new(text) {
                    Ok(event) => {
                        log::debug!("listen: heard {:?}", event.text());
                        Some(event)
                    }
                    Err(e) => {
                        log::debug!("listen: discarded utterance ({e})");
                        None
                    }
                }
            }
            Err(e) => {
                log::warn!("listen: transcription failed: {e}");
                None
            }
        }
    }
}

/// Start the transcriber thread.
///
/// The thread ends when either the capture side hangs up (`chunks` closes)
/// or the dialogue side drops its receiver.
pub fn spawn_transcriber(
    chunks: Receiver<AudioChunk>,
    gate: Arc<MicGate>,
    stt: Arc<dyn SttEngine>,
    config: &AudioConfig,
    events: Sender<TranscriptEvent>,
) -> std::io::Result<JoinHandle<()>> {
    let mut transcriber = Transcriber::new(stt, config);

    thread::Builder::new()
        .name("transcriber".into())
        .spawn(move || {
            while let Ok(chunk) = chunks.recv() {
                for event in transcriber.process(&chunk, &gate) {
                    // Hold results while a reply is playing.
                    gate.wait_open();
                    if events.blocking_send(event).is_err() {
                        log::info!("listen: transcript receiver dropped, transcriber exiting");
                        return;
                    }
                }
            }
            log::info!("listen: capture stream closed, transcriber exiting");
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
