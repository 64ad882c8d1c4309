//! Transcription source — turns microphone audio into a stream of
//! finished utterance transcripts.
//!
//! # Architecture
//!
//! ```text
//! cpal callback ──AudioChunk (std mpsc)──▶ transcriber thread
//!                                            ├─ stereo_to_mono / resample
//!                                            ├─ UtteranceSegmenter (VAD endpointing)
//!                                            └─ SttEngine::transcribe
//!                                                    │
//!                      TranscriptEvent (tokio mpsc) ◀┘
//!                                │
//!                      ChannelTranscripts ──▶ DialogueController::run
//! ```
//!
//! The stream is lazy, unbounded and cannot be restarted: once the sending
//! thread exits, [`TranscriptSource::next_transcript`] returns `None` for
//! good.

pub mod segmenter;
pub mod transcriber;
pub mod transcript;

pub use segmenter::UtteranceSegmenter;
pub use transcriber::spawn_transcriber;
pub use transcript::{ChannelTranscripts, TranscriptError, TranscriptEvent, TranscriptSource};
