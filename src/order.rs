//! Expiration date handling for sell orders.
//!
//! The date field holds `YYYY-MM-DD`. A date is read as midnight UTC, so
//! "today" is already in the past once the day has started.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// Format of the expiration date input
pub const INPUT_FORMAT: &str = "%Y-%m-%d";

/// Default distance of a new order's expiration from now
pub const DEFAULT_EXPIRATION_DAYS: i64 = 30;

/// Longest accepted expiration offset, ten years
pub const MAX_EXPIRATION_DAYS: i64 = 3650;

/// Default expiration for a new order, formatted for the date field.
///
/// Offsets outside `1..=MAX_EXPIRATION_DAYS` use [`DEFAULT_EXPIRATION_DAYS`].
pub fn default_expiration_date(now: DateTime<Utc>, days: i64) -> String {
    let days = if (1..=MAX_EXPIRATION_DAYS).contains(&days) {
        days
    } else {
        tracing::warn!(days, "Expiration offset out of range, using default");
        DEFAULT_EXPIRATION_DAYS
    };
    TimeDelta::try_days(days)
        .and_then(|offset| now.checked_add_signed(offset))
        .unwrap_or(now)
        .format(INPUT_FORMAT)
        .to_string()
}

/// Format an epoch-millisecond expiration for the date field
pub fn format_expiration(expires_at_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(expires_at_ms)
        .map(|d| d.format(INPUT_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse the date field into epoch milliseconds
pub fn parse_expiration(value: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(value.trim(), INPUT_FORMAT).ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().timestamp_millis())
}

/// Whether the date field holds a date in the past. Unparsable input counts
/// as invalid too.
pub fn is_invalid_date(value: &str, now: DateTime<Utc>) -> bool {
    parse_expiration(value).is_none_or(|ms| ms < now.timestamp_millis())
}
