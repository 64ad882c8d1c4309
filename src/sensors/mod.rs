//! Latest-value store for the garden sensors.
//!
//! The MQTT feed task writes readings as they arrive; the dialogue
//! controller reads them when the user asks.  Nothing else is shared
//! between those two contexts.
//!
//! ```text
//! MQTT eventloop ──update()──▶ SensorStore ◀──snapshot()── DialogueController
//! ```

pub mod store;

pub use store::{SensorKey, SensorSnapshot, SensorStore, SharedSensorStore};
