//! Lenient conversions for the textual fields published upstream
//!
//! Every function here is total: malformed input collapses to a fixed
//! fallback value instead of an error.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Timelike, Utc};

/// Layout of the `data_hora` field, e.g. `2021-08-11 07:50:49.173`
pub const DATE_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Upstream timestamps are São Paulo local time without an offset
pub const UPSTREAM_UTC_OFFSET_SECS: i32 = -3 * 3600;

/// Parse a base-10 integer, returning 0 when the text is not one
pub fn int_or_zero(value: &str) -> i64 {
    value.parse::<i64>().unwrap_or(0)
}

/// Parse an availability flag. Only the integer 1 means available.
pub fn flag(value: &str) -> bool {
    matches!(value.parse::<i64>(), Ok(1))
}

/// Parse an upstream timestamp, returning the Unix epoch when it does not match
/// [`DATE_LAYOUT`]
pub fn timestamp_or_epoch(value: &str) -> DateTime<Utc> {
    parse_timestamp(value).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if !matches_layout(value) {
        return None;
    }

    let offset = FixedOffset::east_opt(UPSTREAM_UTC_OFFSET_SECS)?;
    let naive = NaiveDateTime::parse_from_str(value, DATE_LAYOUT).ok()?;
    // chrono encodes second 60 as an overflowing nanosecond
    if naive.nanosecond() >= 1_000_000_000 {
        return None;
    }
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Exact shape `dddd-dd-dd dd:dd:dd` with an optional `.d+` fraction.
/// chrono alone accepts unpadded fields, signs and extra whitespace.
fn matches_layout(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 19 {
        return false;
    }

    let (head, fraction) = bytes.split_at(19);
    let head_ok = head.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        10 => *b == b' ',
        13 | 16 => *b == b':',
        _ => b.is_ascii_digit(),
    });

    head_ok
        && match fraction {
            [] => true,
            [b'.', digits @ ..] => !digits.is_empty() && digits.iter().all(u8::is_ascii_digit),
            _ => false,
        }
}
