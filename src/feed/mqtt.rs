//! MQTT transport for the sensor feed, built on `rumqttc`.
//!
//! [`MqttFeed::connect`] splits the connection into two halves:
//!
//! - [`MqttPublisher`] — cheap to clone, hands outbound commands to the
//!   client's request queue without waiting.
//! - [`MqttFeed::run`] — the receive loop.  It owns the `rumqttc` event loop,
//!   re-subscribes on every ConnAck and writes each inbound reading into the
//!   [`SensorStore`].  Its only externally visible effect is those writes.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};

use crate::config::FeedConfig;
use crate::sensors::SharedSensorStore;

use super::{CommandPublisher, FeedError, OutboundCommand, TopicMap};

/// Capacity of the client → event loop request queue.
const REQUEST_QUEUE: usize = 32;

// ---------------------------------------------------------------------------
// MqttPublisher
// ---------------------------------------------------------------------------

/// Outbound half of the MQTT connection.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl CommandPublisher for MqttPublisher {
    fn publish(&self, command: &OutboundCommand) -> Result<(), FeedError> {
        self.client
            .try_publish(
                command.topic.as_str(),
                QoS::AtMostOnce,
                false,
                command.payload.clone().into_bytes(),
            )
            .map_err(|e| FeedError::Publish {
                topic: command.topic.clone(),
                reason: e.to_string(),
            })?;
        log::info!("feed: published {}={}", command.topic, command.payload);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MqttFeed
// ---------------------------------------------------------------------------

/// Inbound half of the MQTT connection.
pub struct MqttFeed {
    client: AsyncClient,
    eventloop: EventLoop,
    topics: TopicMap,
    reconnect_delay: Duration,
}

impl MqttFeed {
    /// Configure the connection.  Nothing touches the network until
    /// [`run`](Self::run) polls the event loop.
    pub fn connect(config: &FeedConfig) -> (Self, MqttPublisher) {
        let mut options = MqttOptions::new(&config.client_id, &config.broker, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(5)));

        let (client, eventloop) = AsyncClient::new(options, REQUEST_QUEUE);
        let publisher = MqttPublisher {
            client: client.clone(),
        };

        let feed = Self {
            client,
            eventloop,
            topics: TopicMap::from_config(&config.topics),
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
        };
        (feed, publisher)
    }

    /// Drive the connection forever, writing readings into `store`.
    ///
    /// Connection errors are logged and retried after the configured delay;
    /// `rumqttc` reconnects on the next poll.
    pub async fn run(mut self, store: SharedSensorStore) {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    log::info!("feed: connected ({:?})", ack.code);
                    self.subscribe_all();
                }
                Ok(Event::Incoming(Packet::Publish(msg))) => {
                    match self.topics.apply(&store, &msg.topic, &msg.payload) {
                        Ok(key) => log::debug!("feed: {key} = {}", store.read(key)),
                        Err(e @ FeedError::UnknownTopic(_)) => log::debug!("feed: ignored: {e}"),
                        Err(e) => log::warn!("feed: ignored: {e}"),
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!(
                        "feed: connection error ({e}); retrying in {}s",
                        self.reconnect_delay.as_secs()
                    );
                    tokio::time::sleep(self.reconnect_delay).await;
                }
            }
        }
    }

    fn subscribe_all(&self) {
        for topic in self.topics.topics() {
            match self.client.try_subscribe(topic, QoS::AtMostOnce) {
                Ok(()) => log::debug!("feed: subscribed to {topic}"),
                Err(e) => log::warn!("feed: subscribe to {topic} failed: {e}"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publisher_queues_without_network() {
        let (_feed, publisher) = MqttFeed::connect(&FeedConfig::default());
        let cmd = OutboundCommand::new("sensor/moisture-target", "60");
        assert!(publisher.publish(&cmd).is_ok());
    }

    #[tokio::test]
    async fn publisher_reports_full_queue() {
        let (_feed, publisher) = MqttFeed::connect(&FeedConfig::default());
        let cmd = OutboundCommand::new("sensor/moisture-target", "20");

        // Nobody polls the event loop, so the bounded queue fills up.
        let results: Vec<_> = (0..REQUEST_QUEUE + 1)
            .map(|_| publisher.publish(&cmd))
            .collect();
        assert!(results[..REQUEST_QUEUE].iter().all(Result::is_ok));
        assert!(matches!(
            results[REQUEST_QUEUE],
            Err(FeedError::Publish { .. })
        ));
    }

    #[test]
    fn publisher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MqttPublisher>();
    }
}
