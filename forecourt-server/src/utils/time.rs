//! Time helpers
//!
//! All persisted timestamps are RFC 3339 strings in UTC.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time as an RFC 3339 string (millisecond precision)
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a given instant the same way [`now_rfc3339`] does
pub fn to_rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
