//! The decoded `/debug/vars` document.
//!
//! The producer publishes metric families under dotted names with a fixed
//! suffix per shape:
//!
//! | key                 | shape                                   |
//! |---------------------|-----------------------------------------|
//! | `<name>.histogram`  | bucket counts, `[u64]`                  |
//! | `<name>.average`    | `{"average", "count", "min", "max"}`    |
//! | `<name>.minute`     | per-minute counts, `[u64]`              |
//! | `<name>.total`      | running total, integer                  |
//!
//! Nothing is validated on decode; typed accessors return `None` when a key
//! is missing or has an unexpected shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::data::{HistogramStat, TimeSeries};
use crate::error::DashError;

/// One poll's worth of metrics: an opaque map from metric name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw `/debug/vars` body.
    ///
    /// Anything but a JSON object is [`DashError::Decode`].
    pub fn from_slice(body: &[u8]) -> Result<Self, DashError> {
        let vars: Map<String, Value> = serde_json::from_slice(body)?;
        Ok(Self(vars))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Raw histogram bucket counts for a metric family.
    pub fn histogram_counts(&self, name: &str) -> Option<Vec<u64>> {
        let key = format!("{}.histogram", name);
        serde_json::from_value(self.get(&key)?.clone()).ok()
    }

    /// Min/average/max gauge for a metric family.
    pub fn histogram_stat(&self, name: &str) -> Option<HistogramStat> {
        let key = format!("{}.average", name);
        serde_json::from_value(self.get(&key)?.clone()).ok()
    }

    /// Per-minute counts for a metric family, labelled with `label`.
    pub fn minute_series(&self, name: &str, label: &str) -> Option<TimeSeries> {
        let key = format!("{}.minute", name);
        let data: Vec<u64> = serde_json::from_value(self.get(&key)?.clone()).ok()?;
        Some(TimeSeries::new(label, data))
    }

    /// Running total for a metric family, falling back to the bare name.
    pub fn total(&self, name: &str) -> Option<u64> {
        let key = format!("{}.total", name);
        self.get(&key).or_else(|| self.get(name))?.as_u64()
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
