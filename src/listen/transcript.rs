//! [`TranscriptEvent`] and the [`TranscriptSource`] seam.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// TranscriptError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    /// Empty or whitespace-only text is not an utterance.
    #[error("transcript is empty")]
    Empty,
}

// ---------------------------------------------------------------------------
// TranscriptEvent
// ---------------------------------------------------------------------------

/// One finalised utterance.  Never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEvent {
    text: String,
}

impl TranscriptEvent {
    /// Wrap recogniser output, rejecting blank text.
    ///
    /// ```
    /// use garden_voice::listen::{TranscriptError, TranscriptEvent};
    ///
    /// assert!(TranscriptEvent::new("เปิด ระบบ").is_ok());
    /// assert_eq!(TranscriptEvent::new(" \t"), Err(TranscriptError::Empty));
    /// ```
    pub fn new(text: impl Into<String>) -> Result<Self, TranscriptError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(TranscriptError::Empty);
        }
        Ok(Self { text })
    }

    /// The text as recognised.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text with every whitespace character removed.
    ///
    /// Thai is written without spaces between words, but recognisers insert
    /// them between tokens unpredictably; keywords are matched against this
    /// form.
    pub fn compact(&self) -> String {
        self.text.chars().filter(|c| !c.is_whitespace()).collect()
    }
}

// ---------------------------------------------------------------------------
// TranscriptSource
// ---------------------------------------------------------------------------

/// Async, pull-based stream of transcripts.
///
/// `None` means the source has ended and will never yield again.
///
/// `next_transcript` must be cancel-safe: the dialogue loop races it against
/// the idle timeout and drops the future when the timer wins. Dropping it
/// before completion must not consume a transcript; the next call has to
/// return it instead. A bounded `mpsc::Receiver::recv` satisfies this.
#[async_trait]
pub trait TranscriptSource: Send {
    async fn next_transcript(&mut self) -> Option<TranscriptEvent>;
}

/// [`TranscriptSource`] fed by the transcriber thread over a tokio channel.
pub struct ChannelTranscripts {
    rx: mpsc::Receiver<TranscriptEvent>,
}

impl ChannelTranscripts {
    pub fn new(rx: mpsc::Receiver<TranscriptEvent>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl TranscriptSource for ChannelTranscripts {
    async fn next_transcript(&mut self) -> Option<TranscriptEvent> {
        self.rx.recv().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
