//! Timestamp parsing for transaction rows.
//!
//! Sheet timestamps look like `01/15/2024 03:45 PM EST`. The zone suffix is
//! dropped: every comparison in this crate is on local-naive wall-clock time.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

static SHEET_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<year>\d{4})\s+",
        r"(?P<hour>\d{1,2}):(?P<minute>\d{2})\s*(?P<ampm>[AaPp][Mm])",
        r"(?:\s+[A-Za-z]{1,5})?\s*$"
    ))
    .expect("sheet timestamp regex is valid")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%b %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%d %b %Y %I:%M %p",
    "%d %b %Y %H:%M",
    "%d %B %Y %I:%M %p",
    "%d %B %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parse a free-text transaction timestamp.
///
/// Returns `None` for anything unrecognised; callers treat such rows as dateless.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    parse_sheet_timestamp(s).or_else(|| parse_generic(s))
}

fn parse_sheet_timestamp(s: &str) -> Option<NaiveDateTime> {
    let caps = SHEET_TIMESTAMP.captures(s)?;
    let month: u32 = caps["month"].parse().ok()?;
    let day: u32 = caps["day"].parse().ok()?;
    let year: i32 = caps["year"].parse().ok()?;
    let hour12: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;
    if hour12 > 12 {
        return None;
    }

    // 00 and 12 both name the first hour of the half-day.
    let pm = caps["ampm"].eq_ignore_ascii_case("pm");
    let hour = match (hour12, pm) {
        (0 | 12, false) => 0,
        (0 | 12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(date.and_time(time))
}

fn parse_generic(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Parse a configured history horizon such as `2024-01-01`.
pub fn parse_horizon(raw: &str) -> Result<NaiveDateTime> {
    parse_timestamp(raw)
        .with_context(|| format!("invalid horizon '{raw}' (expected YYYY-MM-DD)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_sheet_format_with_zone() {
        assert_eq!(
            parse_timestamp("01/15/2024 03:45 PM EST"),
            Some(at(2024, 1, 15, 15, 45))
        );
        assert_eq!(
            parse_timestamp("07/04/2024 09:05 AM EDT"),
            Some(at(2024, 7, 4, 9, 5))
        );
    }

    #[test]
    fn test_sheet_format_without_zone() {
        assert_eq!(parse_timestamp("02/29/2024 11:00 pm"), Some(at(2024, 2, 29, 23, 0)));
    }

    #[test]
    fn test_twelve_oclock_edges() {
        assert_eq!(parse_timestamp("03/01/2024 12:10 AM ET"), Some(at(2024, 3, 1, 0, 10)));
        assert_eq!(parse_timestamp("03/01/2024 12:10 PM ET"), Some(at(2024, 3, 1, 12, 10)));
    }

    #[test]
    fn test_generic_fallbacks() {
        assert_eq!(parse_timestamp("2024-01-15"), Some(at(2024, 1, 15, 0, 0)));
        assert_eq!(parse_timestamp("2024-01-15T08:30:00"), Some(at(2024, 1, 15, 8, 30)));
        // Offsets are ignored: the wall clock as written is kept.
        assert_eq!(
            parse_timestamp("2024-01-15T08:30:00-05:00"),
            Some(at(2024, 1, 15, 8, 30))
        );
        assert_eq!(parse_timestamp("01/15/2024"), Some(at(2024, 1, 15, 0, 0)));
    }

    #[test]
    fn test_zero_hour_am_is_midnight() {
        assert_eq!(parse_timestamp("01/15/2024 00:30 AM EST"), Some(at(2024, 1, 15, 0, 30)));
        assert_eq!(parse_timestamp("01/15/2024 00:30 PM"), Some(at(2024, 1, 15, 12, 30)));
    }

    #[test]
    fn test_textual_month_forms() {
        assert_eq!(parse_timestamp("Jan 15, 2024"), Some(at(2024, 1, 15, 0, 0)));
        assert_eq!(parse_timestamp("January 15, 2024"), Some(at(2024, 1, 15, 0, 0)));
        assert_eq!(parse_timestamp("15 Jan 2024"), Some(at(2024, 1, 15, 0, 0)));
        assert_eq!(parse_timestamp("15 January 2024"), Some(at(2024, 1, 15, 0, 0)));
        assert_eq!(
            parse_timestamp("January 15, 2024 10:00 AM"),
            Some(at(2024, 1, 15, 10, 0))
        );
        assert_eq!(parse_timestamp("Jan 15, 2024 18:05"), Some(at(2024, 1, 15, 18, 5)));
        assert_eq!(parse_timestamp("15 Jan 2024 07:45 PM"), Some(at(2024, 1, 15, 19, 45)));
        assert_eq!(parse_timestamp("15 January 2024 21:10"), Some(at(2024, 1, 15, 21, 10)));
    }

    #[test]
    fn test_slash_iso_forms() {
        assert_eq!(parse_timestamp("2024/01/15"), Some(at(2024, 1, 15, 0, 0)));
        assert_eq!(parse_timestamp("2024/01/15 08:30"), Some(at(2024, 1, 15, 8, 30)));
        assert_eq!(parse_timestamp("2024/01/15 08:30 PM"), Some(at(2024, 1, 15, 20, 30)));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_timestamp("not-a-date"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("13/45/2024 10:00 AM EST"), None);
    }

    #[test]
    fn test_parse_horizon() {
        assert_eq!(parse_horizon("2024-01-01").unwrap(), at(2024, 1, 1, 0, 0));
        assert!(parse_horizon("someday").is_err());
    }
}
