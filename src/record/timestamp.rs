//! Timestamp default

use chrono::Local;

/// Field that every stored record carries
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Current local time, ISO-8601, truncated to seconds (`2024-05-01T18:30:12`)
pub fn now_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}
