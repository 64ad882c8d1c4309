//! Inbound topic → sensor field table.

use crate::config::TopicConfig;
use crate::sensors::{SensorKey, SensorStore};

use super::FeedError;

/// Maps each inbound topic to exactly one [`SensorKey`].
#[derive(Debug, Clone)]
pub struct TopicMap {
    entries: [(String, SensorKey); 5],
}

impl TopicMap {
    /// Build the table from configured topic names.
    pub fn from_config(topics: &TopicConfig) -> Self {
        Self {
            entries: [
                (topics.light.clone(), SensorKey::Light),
                (topics.moisture.clone(), SensorKey::Moisture),
                (topics.nitrogen.clone(), SensorKey::Nitrogen),
                (topics.phosphorus.clone(), SensorKey::Phosphorus),
                (topics.potassium.clone(), SensorKey::Potassium),
            ],
        }
    }

    /// Sensor fed by `topic`, if any.
    pub fn key_for(&self, topic: &str) -> Option<SensorKey> {
        self.entries
            .iter()
            .find(|(t, _)| t == topic)
            .map(|(_, key)| *key)
    }

    /// Every inbound topic, for subscribing.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    /// Validate one delivery and write it into `store`.
    ///
    /// The payload must be UTF-8 text holding a finite number; surrounding
    /// whitespace is trimmed before storing.  On error the store is left
    /// untouched.
    pub fn apply(
        &self,
        store: &SensorStore,
        topic: &str,
        payload: &[u8],
    ) -> Result<SensorKey, FeedError> {
        let key = self
            .key_for(topic)
            .ok_or_else(|| FeedError::UnknownTopic(topic.to_string()))?;

        let text = std::str::from_utf8(payload).map_err(|e| FeedError::MalformedPayload {
            topic: topic.to_string(),
            reason: e.to_string(),
        })?;
        let value = text.trim();

        match value.parse::<f64>() {
            Ok(n) if n.is_finite() => {}
            _ => {
                return Err(FeedError::MalformedPayload {
                    topic: topic.to_string(),
                    reason: format!("not a number: {value:?}"),
                })
            }
        }

        store.update(key, value);
        Ok(key)
    }
}

impl Default for TopicMap {
    fn default() -> Self {
        Self::from_config(&TopicConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
