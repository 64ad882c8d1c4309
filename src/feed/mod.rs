//! Publish/subscribe sensor feed.
//!
//! # Architecture
//!
//! ```text
//!  broker ──Publish(topic, payload)──▶ TopicMap::apply ──▶ SensorStore
//!
//!  DialogueController ──OutboundCommand──▶ CommandPublisher ──▶ broker
//! ```
//!
//! [`TopicMap`] is the fixed five-entry table from inbound topic to sensor
//! field.  [`CommandPublisher`] is the outbound seam; [`mqtt::MqttPublisher`]
//! is the production implementation.

pub mod mqtt;
pub mod topics;

pub use mqtt::{MqttFeed, MqttPublisher};
pub use topics::TopicMap;

use thiserror::Error;

// ---------------------------------------------------------------------------
// FeedError
// ---------------------------------------------------------------------------

/// Errors raised while handling feed traffic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// An inbound message arrived on a topic outside the sensor table.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// An inbound payload was not UTF-8 numeric text.
    #[error("malformed payload on {topic}: {reason}")]
    MalformedPayload { topic: String, reason: String },

    /// The transport refused an outbound command.
    #[error("publish to {topic} failed: {reason}")]
    Publish { topic: String, reason: String },
}

// ---------------------------------------------------------------------------
// OutboundCommand
// ---------------------------------------------------------------------------

/// Configuration value sent back to the garden node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCommand {
    pub topic: String,
    pub payload: String,
}

impl OutboundCommand {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandPublisher
// ---------------------------------------------------------------------------

/// Fire-and-forget outbound publishing.
///
/// # Contract
///
/// - At most once: implementations never retry.
/// - Returns as soon as the command is handed to the transport; no broker
///   acknowledgement is awaited.
pub trait CommandPublisher: Send + Sync {
    fn publish(&self, command: &OutboundCommand) -> Result<(), FeedError>;
}

// Compile-time assertion: Box<dyn CommandPublisher> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn CommandPublisher>) {}
};
