//! # Date and Time Utilities
//!
//! Timestamps in CBPM are naive local times (Africa/Douala, no DST), stored as
//! text by the database. This module turns that text into `NaiveDateTime` and
//! back.
//!
//! ## Accepted Input Formats
//! ```text
//! ┌──────────────────────────────┬─────────────────────────────────────────┐
//! │ Format                       │ Example                                 │
//! ├──────────────────────────────┼─────────────────────────────────────────┤
//! │ %Y-%m-%d                     │ 2025-03-14                              │
//! │ %d/%m/%Y                     │ 14/03/2025   (regional default)         │
//! │ %m/%d/%Y                     │ 03/14/2025   (only if d/m/Y fails)      │
//! │ %Y-%m-%d %H:%M:%S            │ 2025-03-14 09:30:00  (SQLite default)   │
//! │ %Y-%m-%d %H:%M:%S%.f         │ 2025-03-14 09:30:00.123456              │
//! │ %Y-%m-%dT%H:%M:%S%.f         │ 2025-03-14T09:30:00                     │
//! └──────────────────────────────┴─────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, Weekday};

/// Regional display format for dates.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Regional display format for times.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Storage format for timestamps written by this layer.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE_ONLY_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Current local time without offset.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parses a date or timestamp string.
///
/// Date-only inputs resolve to midnight. Returns `None` when no format
/// matches.
///
/// ## Example
/// ```rust
/// use cbpm_core::datetime::parse_date;
///
/// assert!(parse_date("2025-03-14").is_some());
/// assert!(parse_date("14/03/2025").is_some());
/// assert!(parse_date("yesterday").is_none());
/// ```
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    DATE_ONLY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        })
}

/// Formats a timestamp with a strftime-style format.
pub fn format_date(date: &NaiveDateTime, format: &str) -> String {
    date.format(format).to_string()
}

/// Formats an ISO-8601 string for display.
///
/// A trailing `Z` or explicit offset is accepted. If the text is not a
/// recognizable timestamp it is returned unchanged so the GUI still has
/// something to show.
pub fn format_date_str(text: &str, format: &str) -> String {
    parse_iso(text)
        .map(|dt| format_date(&dt, format))
        .unwrap_or_else(|| text.to_string())
}

fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.naive_local());
    }

    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
}

/// Returns `(end - days, end)` where `end` is now.
pub fn date_range(days: i64) -> (NaiveDateTime, NaiveDateTime) {
    date_range_ending(now(), days)
}

/// Returns `(end - days, end)`.
pub fn date_range_ending(end: NaiveDateTime, days: i64) -> (NaiveDateTime, NaiveDateTime) {
    (days_before(end, days), end)
}

/// `end - days`, saturating at the representable range.
///
/// A period too long to represent reaches back to [`NaiveDateTime::MIN`]
/// (all history); a hugely negative one reaches [`NaiveDateTime::MAX`].
pub fn days_before(end: NaiveDateTime, days: i64) -> NaiveDateTime {
    Duration::try_days(days)
        .and_then(|span| end.checked_sub_signed(span))
        .unwrap_or(if days >= 0 {
            NaiveDateTime::MIN
        } else {
            NaiveDateTime::MAX
        })
}

/// Monday through Friday.
pub fn is_business_day(date: &NaiveDateTime) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2025-03-14"), Some(at(2025, 3, 14, 0, 0, 0)));
        assert_eq!(parse_date("14/03/2025"), Some(at(2025, 3, 14, 0, 0, 0)));
        assert_eq!(parse_date("03/14/2025"), Some(at(2025, 3, 14, 0, 0, 0)));
        assert_eq!(
            parse_date("2025-03-14 09:30:15"),
            Some(at(2025, 3, 14, 9, 30, 15))
        );
        assert_eq!(
            parse_date("2025-03-14T09:30:15"),
            Some(at(2025, 3, 14, 9, 30, 15))
        );
        let fractional = parse_date("2025-03-14 09:30:15.250000").unwrap();
        assert_eq!(fractional.time().format("%H:%M:%S%.3f").to_string(), "09:30:15.250");
    }

    #[test]
    fn test_day_month_wins_when_ambiguous() {
        // 04/03 is 4 March under the regional format, not 3 April
        assert_eq!(parse_date("04/03/2025"), Some(at(2025, 3, 4, 0, 0, 0)));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2025-13-01"), None);
        assert_eq!(parse_date("32/01/2025"), None);
    }

    #[test]
    fn test_format_date() {
        let dt = at(2025, 3, 14, 9, 30, 0);
        assert_eq!(format_date(&dt, DEFAULT_DATE_FORMAT), "14/03/2025");
        assert_eq!(format_date(&dt, STORAGE_FORMAT), "2025-03-14 09:30:00");
    }

    #[test]
    fn test_format_date_str() {
        assert_eq!(
            format_date_str("2025-03-14T09:30:00Z", DEFAULT_DATE_FORMAT),
            "14/03/2025"
        );
        assert_eq!(
            format_date_str("2025-03-14T09:30:00.123456", DEFAULT_DATE_FORMAT),
            "14/03/2025"
        );
        assert_eq!(format_date_str("pending", DEFAULT_DATE_FORMAT), "pending");
    }

    #[test]
    fn test_date_range_ending() {
        let end = at(2025, 3, 31, 12, 0, 0);
        let (start, finish) = date_range_ending(end, 30);
        assert_eq!(finish, end);
        assert_eq!(start, at(2025, 3, 1, 12, 0, 0));
    }

    #[test]
    fn test_huge_ranges_saturate() {
        let end = at(2025, 3, 31, 12, 0, 0);
        assert_eq!(date_range_ending(end, i64::MAX).0, NaiveDateTime::MIN);
        assert_eq!(date_range_ending(end, 1_000_000_000_000).0, NaiveDateTime::MIN);
        // Fits in a Duration but not in the calendar
        assert_eq!(days_before(end, 200_000_000), NaiveDateTime::MIN);
        assert_eq!(days_before(end, i64::MIN), NaiveDateTime::MAX);
        assert_eq!(days_before(end, -1), at(2025, 4, 1, 12, 0, 0));
    }

    #[test]
    fn test_date_range_ends_now() {
        let before = now();
        let (start, end) = date_range(7);
        assert!(end >= before);
        assert_eq!(end - start, Duration::days(7));
    }

    #[test]
    fn test_is_business_day() {
        let friday = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap().and_time(NaiveTime::MIN);
        let saturday = friday + Duration::days(1);
        let sunday = friday + Duration::days(2);
        let monday = friday + Duration::days(3);

        assert!(is_business_day(&friday));
        assert!(!is_business_day(&saturday));
        assert!(!is_business_day(&sunday));
        assert!(is_business_day(&monday));
    }
}
