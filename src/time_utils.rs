// SPDX-License-Identifier: MIT

//! Shared helpers for date/time handling.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time as an RFC3339 string, the format all stored timestamps use.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Check that a calendar-day key is a well-formed `YYYY-MM-DD` date.
///
/// Day keys index the vote/star/block maps, so anything else would
/// silently create garbage map entries.
pub fn is_valid_day_key(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
