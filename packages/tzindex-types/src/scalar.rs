use crate::{DecodeError, DecodeResult};
use chrono::{DateTime, Utc};

/// Parse a Michelson `nat` (serialized as a decimal string).
pub fn parse_nat(field: &'static str, value: &str) -> DecodeResult<u64> {
    value.parse::<u64>().map_err(|_| DecodeError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

/// Parse a Michelson `timestamp`, which is either an RFC 3339 string or a
/// number of seconds since the epoch.
pub fn parse_timestamp(field: &'static str, value: &str) -> DecodeResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or_else(|| DecodeError::InvalidValue {
            field,
            value: value.to_string(),
        })
}
