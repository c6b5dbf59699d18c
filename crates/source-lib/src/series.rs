//! Series decoding
//!
//! Converts one metric's raw JSON response into typed samples. Decoding is
//! best-effort: a fetch that succeeded at the HTTP layer but returned
//! nothing usable yields an empty series, never an error.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// One (timestamp, value) observation for a single metric on a single pod.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Decode a raw payload of `[timestamp_seconds, value]` pairs.
///
/// Absent or non-array payloads decode to an empty series; malformed items
/// are skipped.
pub fn decode(payload: Option<&Value>) -> Vec<Sample> {
    let Some(Value::Array(items)) = payload else {
        return Vec::new();
    };
    items.iter().filter_map(decode_sample).collect()
}

fn decode_sample(item: &Value) -> Option<Sample> {
    let pair = item.as_array()?;
    let seconds = pair.first()?.as_f64()?;
    let value = match pair.get(1)? {
        Value::String(raw) => raw.parse().ok()?,
        other => other.as_f64()?,
    };
    Some(Sample {
        timestamp: instant_from_seconds(seconds)?,
        value,
    })
}

// Upstream timestamps are epoch seconds, possibly fractional.
fn instant_from_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let mut whole = seconds.floor() as i64;
    let mut nanos = ((seconds - seconds.floor()) * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        whole += 1;
        nanos = 0;
    }
    DateTime::from_timestamp(whole, nanos)
}
