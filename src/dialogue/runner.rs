//! Dialogue controller — drives one turn per transcript.
//!
//! # Turn flow
//!
//! ```text
//! transcript
//!   ├─ blank                    → Discarded
//!   ├─ no keyword for state     → Ignored        (state unchanged)
//!   └─ matched Turn
//!        ├─ publish set-point (if any)   ── error → Publish, state unchanged
//!        ├─ pause capture ─┐
//!        ├─ speak reply    │ PauseGuard  ── error → Speech, state unchanged
//!        ├─ resume capture ┘ (always)
//!        └─ commit next state            → Responded
//! ```
//!
//! Turns never overlap: [`DialogueController::run`] awaits each one before
//! pulling the next transcript.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::audio::{pause_capture, CaptureGate};
use crate::config::{DialogueConfig, TopicConfig};
use crate::dialogue::machine::decide;
use crate::dialogue::state::DialogueState;
use crate::feed::{CommandPublisher, FeedError, OutboundCommand};
use crate::listen::{TranscriptEvent, TranscriptSource};
use crate::sensors::SharedSensorStore;
use crate::speech::{SpeechError, SpeechSink};

// ---------------------------------------------------------------------------
// DialogueError
// ---------------------------------------------------------------------------

/// Why a turn failed.  The dialogue state is unchanged in every case.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("reply could not be spoken: {0}")]
    Speech(#[from] SpeechError),

    #[error("set-point could not be published: {0}")]
    Publish(#[from] FeedError),
}

// ---------------------------------------------------------------------------
// TurnOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank transcript; nothing happened.
    Discarded,
    /// No keyword valid in the current state.
    Ignored,
    /// A reply was spoken and the state moved to `next`.
    Responded {
        next: DialogueState,
        command: Option<OutboundCommand>,
    },
}

// ---------------------------------------------------------------------------
// DialogueController
// ---------------------------------------------------------------------------

/// Owns the [`DialogueState`] and the side-effect seams a turn needs.
pub struct DialogueController {
    state: DialogueState,
    sensors: SharedSensorStore,
    speech: Arc<dyn SpeechSink>,
    gate: Arc<dyn CaptureGate>,
    publisher: Arc<dyn CommandPublisher>,
    language: String,
    target_topic: String,
    idle_timeout: Option<Duration>,
}

impl DialogueController {
    /// A controller in [`DialogueState::Idle`], speaking Thai and publishing
    /// set-points to the default moisture-target topic.
    pub fn new(
        sensors: SharedSensorStore,
        speech: Arc<dyn SpeechSink>,
        gate: Arc<dyn CaptureGate>,
        publisher: Arc<dyn CommandPublisher>,
    ) -> Self {
        Self {
            state: DialogueState::Idle,
            sensors,
            speech,
            gate,
            publisher,
            language: "th".into(),
            target_topic: TopicConfig::default().moisture_target,
            idle_timeout: None,
        }
    }

    /// Language tag passed to the speech sink.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Topic confirmed set-points are published to.
    pub fn with_target_topic(mut self, topic: impl Into<String>) -> Self {
        self.target_topic = topic.into();
        self
    }

    /// Fall back to idle when a question goes unanswered for `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Apply the `[dialogue]` config section.
    pub fn with_config(self, config: &DialogueConfig) -> Self {
        self.with_idle_timeout(config.idle_timeout_secs.map(Duration::from_secs))
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    /// Run one turn for raw recogniser text.
    pub async fn handle(&mut self, raw: &str) -> Result<TurnOutcome, DialogueError> {
        match TranscriptEvent::new(raw) {
            Ok(event) => self.handle_event(&event).await,
            Err(_) => Ok(TurnOutcome::Discarded),
        }
    }

    /// Run one turn for a finalised transcript.
    pub async fn handle_event(
        &mut self,
        event: &TranscriptEvent,
    ) -> Result<TurnOutcome, DialogueError> {
        log::info!("dialogue: [{}] heard {:?}", self.state, event.text());

        let snapshot = self.sensors.snapshot();
        let Some(turn) = decide(self.state, event, &snapshot, &self.target_topic) else {
            log::debug!("dialogue: no keyword for {}, ignoring", self.state);
            return Ok(TurnOutcome::Ignored);
        };

        if let Some(command) = &turn.command {
            self.publisher.publish(command)?;
            log::info!("dialogue: set {} = {}", command.topic, command.payload);
        }

        {
            let _paused = pause_capture(self.gate.as_ref());
            self.speech
                .speak(&turn.response.text, &self.language)
                .await?;
        }

        let next = turn.response.next;
        log::debug!("dialogue: {} → {}", self.state, next);
        self.state = next;

        Ok(TurnOutcome::Responded {
            next,
            command: turn.command,
        })
    }

    /// Process transcripts until `source` ends.
    ///
    /// A failed turn is logged and the loop carries on with the next
    /// transcript.
    pub async fn run<S>(&mut self, source: &mut S)
    where
        S: TranscriptSource + ?Sized,
    {
        loop {
            let next = match self.idle_timeout.filter(|_| !self.state.is_idle()) {
                Some(limit) => {
                    match tokio::time::timeout(limit, source.next_transcript()).await {
                        Ok(next) => next,
                        Err(_) => {
                            log::info!(
                                "dialogue: no answer in {} after {limit:?}, back to idle",
                                self.state
                            );
                            self.state = DialogueState::Idle;
                            continue;
                        }
                    }
                }
                None => source.next_transcript().await,
            };

            let Some(event) = next else {
                break;
            };

            match self.handle_event(&event).await {
                Ok(outcome) => log::debug!("dialogue: turn finished: {outcome:?}"),
                Err(e) => log::error!("dialogue: turn failed: {e}"),
            }
        }

        log::info!("dialogue: transcript source ended, controller stopping");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::audio::{decode_mp3, MicGate, PlaybackError};
    use crate::dialogue::vocab;
    use crate::listen::ChannelTranscripts;
    use crate::sensors::{SensorKey, SensorStore};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    type Log = Arc<Mutex<Vec<String>>>;

    struct RecordingGate(Log);

    impl CaptureGate for RecordingGate {
        fn pause(&self) {
            self.0.lock().unwrap().push("pause".into());
        }
        fn resume(&self) {
            self.0.lock().unwrap().push("resume".into());
        }
    }

    enum SinkMode {
        Ok,
        FailSynthesis,
        FailPlayback,
        /// Synthesis "succeeded" with an HTML page instead of MP3.
        NotAudio,
        Hang,
    }

    struct RecordingSink {
        log: Log,
        mode: SinkMode,
    }

    #[async_trait]
    impl SpeechSink for RecordingSink {
        async fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError> {
            self.log.lock().unwrap().push(format!("speak[{language}]:{text}"));
            match self.mode {
                SinkMode::Ok => Ok(()),
                SinkMode::FailSynthesis => Err(SpeechError::Synthesis("offline".into())),
                SinkMode::FailPlayback => Err(SpeechError::Playback(PlaybackError::NoDevice)),
                SinkMode::NotAudio => {
                    decode_mp3(b"<html><body>unusual traffic</body></html>")?;
                    Ok(())
                }
                SinkMode::Hang => std::future::pending().await,
            }
        }
    }

    struct RecordingPublisher {
        log: Log,
        fail: bool,
    }

    impl CommandPublisher for RecordingPublisher {
        fn publish(&self, command: &OutboundCommand) -> Result<(), FeedError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("publish:{}={}", command.topic, command.payload));
            if self.fail {
                Err(FeedError::Publish {
                    topic: command.topic.clone(),
                    reason: "queue full".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    struct Rig {
        controller: DialogueController,
        log: Log,
        sensors: SharedSensorStore,
    }

    fn rig_with(mode: SinkMode, publish_fails: bool) -> Rig {
        let log: Log = Arc::default();
        let sensors = SensorStore::shared();
        let controller = DialogueController::new(
            Arc::clone(&sensors),
            Arc::new(RecordingSink {
                log: Arc::clone(&log),
                mode,
            }),
            Arc::new(RecordingGate(Arc::clone(&log))),
            Arc::new(RecordingPublisher {
                log: Arc::clone(&log),
                fail: publish_fails,
            }),
        );
        Rig {
            controller,
            log,
            sensors,
        }
    }

    fn rig() -> Rig {
        rig_with(SinkMode::Ok, false)
    }

    fn events(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn wake_pauses_speaks_resumes_then_moves_on() {
        let mut r = rig();

        let outcome = r.controller.handle("เปิด ระบบ").await.unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Responded {
                next: DialogueState::AwaitingIntent,
                command: None
            }
        );
        assert_eq!(r.controller.state(), DialogueState::AwaitingIntent);
        assert_eq!(
            events(&r.log),
            vec![
                "pause".to_string(),
                format!("speak[th]:{}", vocab::REPLY_WAKE),
                "resume".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn setpoint_is_published_before_the_reply() {
        let mut r = rig();
        r.controller.state = DialogueState::AwaitingSetupValue;

        let outcome = r.controller.handle("หกสิบ").await.unwrap();

        let expected = OutboundCommand::new("sensor/moisture-target", "60");
        assert_eq!(
            outcome,
            TurnOutcome::Responded {
                next: DialogueState::Idle,
                command: Some(expected)
            }
        );
        let log = events(&r.log);
        assert_eq!(log[0], "publish:sensor/moisture-target=60");
        assert_eq!(log[1], "pause");
        assert!(log[2].contains("60"));
        assert_eq!(log[3], "resume");
        assert_eq!(log.len(), 4);
    }

    #[tokio::test]
    async fn failing_synthesis_still_resumes_and_keeps_state() {
        let mut r = rig_with(SinkMode::FailSynthesis, false);

        let err = r.controller.handle("เปิดระบบ").await.unwrap_err();

        assert!(matches!(err, DialogueError::Speech(SpeechError::Synthesis(_))));
        assert_eq!(r.controller.state(), DialogueState::Idle);
        assert_eq!(events(&r.log).last().map(String::as_str), Some("resume"));
    }

    #[tokio::test]
    async fn failing_playback_still_resumes_and_keeps_state() {
        let mut r = rig_with(SinkMode::FailPlayback, false);
        r.controller.state = DialogueState::AwaitingCheckTarget;

        let err = r.controller.handle("แสง").await.unwrap_err();

        assert!(matches!(err, DialogueError::Speech(SpeechError::Playback(_))));
        assert_eq!(r.controller.state(), DialogueState::AwaitingCheckTarget);
        let log = events(&r.log);
        assert_eq!(log.first().map(String::as_str), Some("pause"));
        assert_eq!(log.last().map(String::as_str), Some("resume"));
    }

    #[tokio::test]
    async fn non_audio_reply_keeps_state_and_resumes() {
        let mut r = rig_with(SinkMode::NotAudio, false);
        r.controller.state = DialogueState::AwaitingIntent;

        let err = r.controller.handle("เช็ค").await.unwrap_err();

        assert!(matches!(
            err,
            DialogueError::Speech(SpeechError::Playback(PlaybackError::Decode(_)))
        ));
        assert_eq!(r.controller.state(), DialogueState::AwaitingIntent);
        let log = events(&r.log);
        assert_eq!(log.first().map(String::as_str), Some("pause"));
        assert_eq!(log.last().map(String::as_str), Some("resume"));
    }

    #[tokio::test]
    async fn cancelled_turn_resumes_capture() {
        let log: Log = Arc::default();
        let gate = MicGate::shared();
        let mut controller = DialogueController::new(
            SensorStore::shared(),
            Arc::new(RecordingSink {
                log: Arc::clone(&log),
                mode: SinkMode::Hang,
            }),
            gate.clone(),
            Arc::new(RecordingPublisher {
                log: Arc::clone(&log),
                fail: false,
            }),
        );

        let turn = controller.handle("เปิดระบบ");
        let res = tokio::time::timeout(Duration::from_millis(20), turn).await;

        assert!(res.is_err(), "hanging sink should time out");
        assert!(gate.is_open());
        assert_eq!(controller.state(), DialogueState::Idle);
    }

    #[tokio::test]
    async fn publish_failure_aborts_before_speaking() {
        let mut r = rig_with(SinkMode::Ok, true);
        r.controller.state = DialogueState::AwaitingSetupValue;

        let err = r.controller.handle("แปดสิบ").await.unwrap_err();

        assert!(matches!(err, DialogueError::Publish(FeedError::Publish { .. })));
        assert_eq!(r.controller.state(), DialogueState::AwaitingSetupValue);
        assert_eq!(events(&r.log), vec!["publish:sensor/moisture-target=80"]);
    }

    #[tokio::test]
    async fn blank_transcript_is_discarded() {
        let mut r = rig();
        for raw in ["", "   ", "\n\t"] {
            assert_eq!(r.controller.handle(raw).await.unwrap(), TurnOutcome::Discarded);
        }
        assert_eq!(r.controller.state(), DialogueState::Idle);
        assert!(events(&r.log).is_empty());
    }

    #[tokio::test]
    async fn unmatched_transcript_changes_nothing() {
        for state in DialogueState::ALL {
            let mut r = rig();
            r.sensors.update(SensorKey::Moisture, "33");
            r.controller.state = state;
            let before = r.sensors.snapshot();

            let outcome = r.controller.handle("วันนี้อากาศดี").await.unwrap();

            assert_eq!(outcome, TurnOutcome::Ignored);
            assert_eq!(r.controller.state(), state);
            assert_eq!(r.sensors.snapshot(), before);
            assert!(events(&r.log).is_empty());
        }
    }

    #[tokio::test]
    async fn check_reads_live_store() {
        let mut r = rig();
        r.controller.state = DialogueState::AwaitingCheckTarget;
        r.sensors.update(SensorKey::Moisture, "42");

        r.controller.handle("ความชื้น").await.unwrap();

        let log = events(&r.log);
        assert!(log[1].contains("42"), "{log:?}");
        assert_eq!(r.controller.state(), DialogueState::Idle);
    }

    #[tokio::test]
    async fn language_and_topic_are_configurable() {
        let mut r = rig();
        r.controller = r
            .controller
            .with_language("th-TH")
            .with_target_topic("farm/target");
        r.controller.state = DialogueState::AwaitingSetupValue;

        r.controller.handle("ยี่สิบ").await.unwrap();

        let log = events(&r.log);
        assert_eq!(log[0], "publish:farm/target=20");
        assert!(log[2].starts_with("speak[th-TH]:"));
    }

    #[tokio::test]
    async fn run_handles_every_transcript_in_order() {
        let mut r = rig_with(SinkMode::FailSynthesis, false);
        let (tx, rx) = mpsc::channel(8);
        for text in ["เปิดระบบ", "เปิดระบบ"] {
            tx.send(TranscriptEvent::new(text).unwrap()).await.unwrap();
        }
        drop(tx);

        r.controller.run(&mut ChannelTranscripts::new(rx)).await;

        // Both turns failed but the loop kept going.
        let speaks = events(&r.log)
            .iter()
            .filter(|e| e.starts_with("speak"))
            .count();
        assert_eq!(speaks, 2);
        assert_eq!(r.controller.state(), DialogueState::Idle);
    }

    #[tokio::test]
    async fn idle_timeout_returns_to_idle() {
        let mut r = rig();
        r.controller = r
            .controller
            .with_idle_timeout(Some(Duration::from_millis(30)));

        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            tx.send(TranscriptEvent::new("เปิดระบบ").unwrap()).await.unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            // Too late: the controller is idle again, so this is ignored.
            tx.send(TranscriptEvent::new("เช็ค").unwrap()).await.unwrap();
        });

        r.controller.run(&mut ChannelTranscripts::new(rx)).await;

        assert_eq!(r.controller.state(), DialogueState::Idle);
        let speaks = events(&r.log)
            .iter()
            .filter(|e| e.starts_with("speak"))
            .count();
        assert_eq!(speaks, 1);
    }

    #[test]
    fn config_sets_idle_timeout() {
        let r = rig();
        let controller = r.controller.with_config(&DialogueConfig {
            idle_timeout_secs: Some(45),
        });
        assert_eq!(controller.idle_timeout, Some(Duration::from_secs(45)));

        let controller = controller.with_config(&DialogueConfig::default());
        assert_eq!(controller.idle_timeout, None);
    }

    #[tokio::test]
    async fn without_timeout_state_persists() {
        let mut r = rig();
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            tx.send(TranscriptEvent::new("เปิดระบบ").unwrap()).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            tx.send(TranscriptEvent::new("เช็ค").unwrap()).await.unwrap();
        });

        r.controller.run(&mut ChannelTranscripts::new(rx)).await;

        assert_eq!(r.controller.state(), DialogueState::AwaitingCheckTarget);
    }
}
