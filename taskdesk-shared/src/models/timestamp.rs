/// Timestamp storage mapping
///
/// Timestamps are stored as INTEGER microseconds since the Unix epoch. The
/// integer form sorts correctly in SQL and makes "strictly later than" exact.

use chrono::{DateTime, Utc};

/// Current time truncated to microsecond precision
pub fn now() -> DateTime<Utc> {
    from_micros(Utc::now().timestamp_micros()).unwrap_or_else(Utc::now)
}

/// Converts a timestamp to its stored form
pub fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

/// Converts a stored value back to a timestamp
pub fn from_micros(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
}

/// Decodes a stored column, reporting out-of-range values as decode errors
pub(crate) fn decode_micros(column: &str, micros: i64) -> Result<DateTime<Utc>, sqlx::Error> {
    from_micros(micros).ok_or_else(|| {
        sqlx::Error::Decode(format!("{} out of range: {}", column, micros).into())
    })
}

/// Next modification timestamp for a record last touched at `previous`
///
/// Never returns a value at or before `previous`, even if the clock has not
/// advanced or has stepped backwards.
pub fn next_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let floor = to_micros(previous).saturating_add(1);
    let candidate = to_micros(now()).max(floor);
    from_micros(candidate).unwrap_or(previous)
}
