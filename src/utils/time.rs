use chrono::{DateTime, Utc};

/// Returns current timestamp in nanoseconds (Unix epoch)
pub fn current_timestamp_nanos() -> i64 {
    // Only fails past the year 2262.
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Converts a stored nanosecond timestamp back into a UTC datetime
pub fn from_timestamp_nanos(nanos: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(nanos)
}
