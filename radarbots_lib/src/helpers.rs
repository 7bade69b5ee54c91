//! Helpers for reading and displaying directory responses.

use chrono::{DateTime, Local, Utc};
use serde_json::Value;

/// Epoch values above this are taken to be milliseconds.
const MILLIS_THRESHOLD: u64 = 100_000_000_000;
const TIMESTAMP_KEYS: [&str; 3] = ["lastVoted", "last_voted", "timestamp"];

/// Convert a Unix timestamp in seconds or milliseconds to UTC.
pub fn epoch_to_datetime(epoch: i64) -> Option<DateTime<Utc>> {
    if epoch.unsigned_abs() > MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    }
}

/// Format a Unix timestamp for display. If `use_utc` is true, shows UTC; otherwise
/// converts to local timezone. Out-of-range values are returned as the bare number.
pub fn format_epoch_display(epoch: i64, use_utc: bool) -> String {
    let dt = match epoch_to_datetime(epoch) {
        Some(d) => d,
        None => return epoch.to_string(),
    };
    if use_utc {
        dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    } else {
        dt.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S %:z")
            .to_string()
    }
}

/// Pull the vote timestamp out of a last-voted body: a bare number (or numeric string),
/// or an object holding one under a known key.
pub fn last_voted_timestamp(body: &Value) -> Option<i64> {
    match body {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => TIMESTAMP_KEYS
            .iter()
            .find_map(|k| map.get(*k))
            .and_then(last_voted_timestamp),
        _ => None,
    }
}
