use coopsync_api::parse::{number_field, timestamp_field};
use serde_json::Value;
use time::OffsetDateTime;

use crate::calendar::SECONDS_PER_DAY;

/// One valid reading of a log collection: a positive timestamp whose local
/// date is representable and a positive, finite value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Option<Self> {
        let sample = Self { timestamp, value };

        sample.is_valid().then_some(sample)
    }

    /// Reads `timestamp` and `value_field` from a raw record.
    pub fn from_record(record: &Value, value_field: &str) -> Option<Self> {
        let timestamp = timestamp_field(record, "timestamp")?;
        let value = number_field(record, value_field)?;

        Self::new(timestamp, value)
    }

    pub fn is_valid(&self) -> bool {
        self.timestamp > 0
            && representable(self.timestamp)
            && self.value.is_finite()
            && self.value > 0.0
    }
}

/// Leaves two days of headroom so shifting to any UTC offset stays in range.
fn representable(timestamp: i64) -> bool {
    OffsetDateTime::from_unix_timestamp(timestamp.saturating_add(2 * SECONDS_PER_DAY)).is_ok()
}

/// Children of a collection node with their keys.
///
/// The store returns collections whose keys are small integers as JSON
/// arrays with `null` holes, so both shapes are accepted.
pub fn children(collection: &Value) -> Vec<(String, &Value)> {
    match collection {
        Value::Object(map) => map.iter().map(|(key, value)| (key.clone(), value)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
        _ => Vec::new(),
    }
}

/// Drops every record without a usable timestamp and value.
pub fn clean<'a, I>(records: I, value_field: &str) -> Vec<Sample>
where
    I: IntoIterator<Item = &'a Value>,
{
    records
        .into_iter()
        .filter_map(|record| Sample::from_record(record, value_field))
        .collect()
}

/// Reads every record of a collection node.
pub fn clean_collection(collection: &Value, value_field: &str) -> Vec<Sample> {
    clean(children(collection).into_iter().map(|(_, record)| record), value_field)
}

pub fn clean_samples(samples: &[Sample]) -> Vec<Sample> {
    samples.iter().copied().filter(Sample::is_valid).collect()
}
