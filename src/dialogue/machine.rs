//! The transition function.
//!
//! [`decide`] is pure: the same state, transcript and snapshot always give
//! the same [`Turn`].  Side effects (publishing, speaking, gating the
//! microphone) belong to [`DialogueController`](super::DialogueController).

use crate::dialogue::state::DialogueState;
use crate::dialogue::vocab;
use crate::feed::OutboundCommand;
use crate::listen::TranscriptEvent;
use crate::sensors::SensorSnapshot;

/// What to say, and where the conversation goes once it has been said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceResponse {
    pub text: String,
    pub next: DialogueState,
}

/// The outcome of a matched transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub response: UtteranceResponse,
    /// Set-point to publish before the reply is spoken.
    pub command: Option<OutboundCommand>,
}

impl Turn {
    fn reply(text: impl Into<String>, next: DialogueState) -> Self {
        Self {
            response: UtteranceResponse {
                text: text.into(),
                next,
            },
            command: None,
        }
    }
}

/// Match `transcript` against the keywords valid in `state`.
///
/// Returns `None` when nothing matches; the state is then left as it is.
/// `target_topic` is where a confirmed moisture set-point is published.
pub fn decide(
    state: DialogueState,
    transcript: &TranscriptEvent,
    snapshot: &SensorSnapshot,
    target_topic: &str,
) -> Option<Turn> {
    use DialogueState::*;

    let text = transcript.compact();

    match state {
        Idle => vocab::contains_any(&text, vocab::WAKE)
            .then(|| Turn::reply(vocab::REPLY_WAKE, AwaitingIntent)),

        AwaitingIntent => {
            if vocab::contains_any(&text, vocab::EDIT) {
                Some(Turn::reply(vocab::REPLY_EDIT, AwaitingSetupValue))
            } else if vocab::contains_any(&text, vocab::CHECK) {
                Some(Turn::reply(vocab::REPLY_CHECK, AwaitingCheckTarget))
            } else {
                None
            }
        }

        AwaitingCheckTarget => {
            let reply = if vocab::contains_any(&text, vocab::LIGHT) {
                vocab::light_reply(snapshot)
            } else if vocab::contains_any(&text, vocab::MOISTURE) {
                vocab::moisture_reply(snapshot)
            } else if vocab::contains_any(&text, vocab::FERTILIZER) {
                vocab::fertilizer_reply(snapshot)
            } else {
                return None;
            };
            Some(Turn::reply(reply, Idle))
        }

        AwaitingSetupValue => vocab::setpoint_in(&text).map(|value| Turn {
            response: UtteranceResponse {
                text: vocab::setpoint_reply(value),
                next: Idle,
            },
            command: Some(OutboundCommand::new(target_topic, value.to_string())),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
