//! Human-readable document numbers
//!
//! `ORD-YYMM-NNNN` / `TXN-YYMM-NNNN`. The NNNN part comes from a per-month
//! counter bumped atomically in the database (`SequenceRepository`), so the
//! numbers stay unique under concurrent creation.

use chrono::{DateTime, Datelike, Utc};

pub const ORDER_PREFIX: &str = "ORD";
pub const TXN_PREFIX: &str = "TXN";

/// Counter scope for a prefix and month, e.g. "ord_2608"
pub fn month_scope(prefix: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{:02}{:02}",
        prefix.to_lowercase(),
        at.year() % 100,
        at.month()
    )
}

/// Format a document number, e.g. `ORD-2608-0001`.
///
/// Width grows past 4 digits instead of wrapping.
pub fn format_number(prefix: &str, at: DateTime<Utc>, seq: i64) -> String {
    format!(
        "{}-{:02}{:02}-{:04}",
        prefix,
        at.year() % 100,
        at.month(),
        seq
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(ORDER_PREFIX, at(2026, 8), 1), "ORD-2608-0001");
        assert_eq!(format_number(TXN_PREFIX, at(2026, 12), 42), "TXN-2612-0042");
    }

    #[test]
    fn test_number_width_grows() {
        assert_eq!(format_number(ORDER_PREFIX, at(2026, 1), 12345), "ORD-2601-12345");
    }

    #[test]
    fn test_month_scope() {
        assert_eq!(month_scope(ORDER_PREFIX, at(2026, 8)), "ord_2608");
        assert_eq!(month_scope(TXN_PREFIX, at(2030, 2)), "txn_3002");
        // Scopes differ across months, so counters reset per month
        assert_ne!(month_scope(ORDER_PREFIX, at(2026, 8)), month_scope(ORDER_PREFIX, at(2026, 9)));
    }
}
