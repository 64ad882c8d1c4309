//! [`SensorStore`] holds one string-encoded reading per [`SensorKey`].
//!
//! Each field sits behind its own `RwLock`, so a read never observes a
//! half-written value and writers to different keys never contend.  There
//! is no cross-field consistency: the feed updates fields independently and
//! the dialogue reads them one at a time.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Value reported for a sensor that has not been heard from yet.
pub const ZERO_READING: &str = "0";

// ---------------------------------------------------------------------------
// SensorKey
// ---------------------------------------------------------------------------

/// The fixed set of sensors on the garden node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKey {
    Light,
    Moisture,
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl SensorKey {
    /// All keys, in storage order.
    pub const ALL: [SensorKey; 5] = [
        SensorKey::Light,
        SensorKey::Moisture,
        SensorKey::Nitrogen,
        SensorKey::Phosphorus,
        SensorKey::Potassium,
    ];

    fn index(self) -> usize {
        match self {
            SensorKey::Light => 0,
            SensorKey::Moisture => 1,
            SensorKey::Nitrogen => 2,
            SensorKey::Phosphorus => 3,
            SensorKey::Potassium => 4,
        }
    }

    /// Lower-case name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            SensorKey::Light => "light",
            SensorKey::Moisture => "moisture",
            SensorKey::Nitrogen => "nitrogen",
            SensorKey::Phosphorus => "phosphorus",
            SensorKey::Potassium => "potassium",
        }
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// SensorSnapshot
// ---------------------------------------------------------------------------

/// Plain copy of every reading at one point in time.
///
/// Built field by field from the store, so two fields may come from
/// different feed deliveries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSnapshot {
    pub light: String,
    pub moisture: String,
    pub nitrogen: String,
    pub phosphorus: String,
    pub potassium: String,
}

impl SensorSnapshot {
    /// Reading for `key`.
    pub fn get(&self, key: SensorKey) -> &str {
        match key {
            SensorKey::Light => &self.light,
            SensorKey::Moisture => &self.moisture,
            SensorKey::Nitrogen => &self.nitrogen,
            SensorKey::Phosphorus => &self.phosphorus,
            SensorKey::Potassium => &self.potassium,
        }
    }

    /// Replace the reading for `key`, returning the updated snapshot.
    pub fn with(mut self, key: SensorKey, value: impl Into<String>) -> Self {
        let slot = match key {
            SensorKey::Light => &mut self.light,
            SensorKey::Moisture => &mut self.moisture,
            SensorKey::Nitrogen => &mut self.nitrogen,
            SensorKey::Phosphorus => &mut self.phosphorus,
            SensorKey::Potassium => &mut self.potassium,
        };
        *slot = value.into();
        self
    }
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            light: ZERO_READING.into(),
            moisture: ZERO_READING.into(),
            nitrogen: ZERO_READING.into(),
            phosphorus: ZERO_READING.into(),
            potassium: ZERO_READING.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SensorStore
// ---------------------------------------------------------------------------

/// Last-writer-wins store of the latest reading per sensor.
pub struct SensorStore {
    readings: [RwLock<String>; 5],
}

/// Thread-safe handle to a [`SensorStore`].  Cheap to clone.
pub type SharedSensorStore = Arc<SensorStore>;

impl SensorStore {
    /// Create a store with every reading at `"0"`.
    pub fn new() -> Self {
        Self {
            readings: std::array::from_fn(|_| RwLock::new(ZERO_READING.to_string())),
        }
    }

    /// Create a store wrapped in an `Arc`, ready to share between tasks.
    pub fn shared() -> SharedSensorStore {
        Arc::new(Self::new())
    }

    /// Overwrite the reading for `key`.
    pub fn update(&self, key: SensorKey, value: impl Into<String>) {
        let value = value.into();
        let mut slot = self.readings[key.index()]
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = value;
    }

    /// Latest reading for `key`, or `"0"` when none has arrived.
    pub fn read(&self, key: SensorKey) -> String {
        self.readings[key.index()]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Copy out every reading.
    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            light: self.read(SensorKey::Light),
            moisture: self.read(SensorKey::Moisture),
            nitrogen: self.read(SensorKey::Nitrogen),
            phosphorus: self.read(SensorKey::Phosphorus),
            potassium: self.read(SensorKey::Potassium),
        }
    }
}

impl Default for SensorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SensorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorStore")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unread_key_is_zero() {
        let store = SensorStore::new();
        for key in SensorKey::ALL {
            assert_eq!(store.read(key), "0");
        }
    }

    #[test]
    fn update_then_read() {
        let store = SensorStore::new();
        store.update(SensorKey::Moisture, "17");
        assert_eq!(store.read(SensorKey::Moisture), "17");
        assert_eq!(store.read(SensorKey::Light), "0");
    }

    #[test]
    fn last_writer_wins() {
        let store = SensorStore::new();
        store.update(SensorKey::Light, "100");
        store.update(SensorKey::Light, "250");
        store.update(SensorKey::Light, "250");
        assert_eq!(store.read(SensorKey::Light), "250");
    }

    #[test]
    fn snapshot_copies_every_field() {
        let store = SensorStore::new();
        store.update(SensorKey::Nitrogen, "12");
        store.update(SensorKey::Potassium, "7");

        let snap = store.snapshot();
        assert_eq!(snap.get(SensorKey::Nitrogen), "12");
        assert_eq!(snap.get(SensorKey::Potassium), "7");
        assert_eq!(snap.get(SensorKey::Phosphorus), "0");

        // Later updates do not leak into an earlier snapshot.
        store.update(SensorKey::Nitrogen, "99");
        assert_eq!(snap.nitrogen, "12");
    }

    #[test]
    fn snapshot_with_replaces_one_field() {
        let snap = SensorSnapshot::default().with(SensorKey::Moisture, "42");
        assert_eq!(snap.moisture, "42");
        assert_eq!(snap.light, "0");
    }

    #[test]
    fn shared_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedSensorStore>();
    }

    #[test]
    fn writers_on_other_threads_are_visible() {
        let store = SensorStore::shared();
        let handles: Vec<_> = SensorKey::ALL
            .into_iter()
            .enumerate()
            .map(|(i, key)| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.update(key, i.to_string()))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for (i, key) in SensorKey::ALL.into_iter().enumerate() {
            assert_eq!(store.read(key), i.to_string());
        }
    }
}
