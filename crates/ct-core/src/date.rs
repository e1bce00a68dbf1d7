//! Parsing of user-supplied dates and times.
//!
//! Anything the user leaves out is filled in from `now`: a bare time of day
//! means today, a bare month and day means the current year. Summary windows
//! then roll future values back a year (see [`crate::TimeWindow::resolve`]).

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use thiserror::Error;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(minute|min|hour|hr|day|week)s?\s+ago$").unwrap()
});

/// Pre-compiled regex for hour-only clock times like `5pm`.
static BARE_HOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s*(am|pm)$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dt%H:%M:%S",
    "%Y-%m-%dt%H:%M",
    "%Y-%m-%d %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m-%d-%Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%b %d %Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%I:%M %p on %b %d, %Y",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%b %d %Y", "%b %d, %Y", "%B %d %Y", "%B %d, %Y"];

/// Formats without a year; parsed with the current year appended.
const YEARLESS_FORMATS: &[&str] = &[
    "%m/%d %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%m/%d %H:%M %Y",
    "%b %d %H:%M %Y",
    "%b %d %I:%M %p %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p", "%I:%M:%S %p"];

/// A date the user typed could not be understood.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error(
        "could not understand date {input:?}; try \"2020-01-31 17:00\", \"01/31/2020\", \"jan 31\", \"5:30pm\" or \"2 hours ago\""
    )]
    Unrecognized { input: String },

    #[error("relative time value too large: {input:?}")]
    OutOfRange { input: String },
}

/// Parses a user-supplied date or time, filling gaps from `now`.
///
/// Supports:
/// - keywords: `now`, `today`, `yesterday`
/// - relative: `30 minutes ago`, `2 hours ago`, `1 day ago`, `1 week ago`
/// - full date-times: `2020-01-31 17:00`, `01/31/2020 5:00 PM`, RFC 3339
/// - dates (midnight): `2020-01-31`, `jan 31 2020`, `jan 31` (current year)
/// - times of day (today): `17:00`, `5:30pm`, `5pm`
pub fn parse_user_date(input: &str, now: NaiveDateTime) -> Result<NaiveDateTime, DateParseError> {
    let s = input.trim().to_lowercase();
    let unrecognized = || DateParseError::Unrecognized {
        input: input.to_string(),
    };

    match s.as_str() {
        "" => return Err(unrecognized()),
        "now" => return Ok(now),
        "today" => return Ok(now.date().and_time(NaiveTime::MIN)),
        "yesterday" => {
            let yesterday = now.date().pred_opt().ok_or_else(unrecognized)?;
            return Ok(yesterday.and_time(NaiveTime::MIN));
        }
        _ => {}
    }

    if let Some(caps) = RELATIVE_TIME_RE.captures(&s) {
        return parse_relative(input, &caps[1], &caps[2], now);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input.trim()) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&s, fmt).ok())
    {
        return Ok(dt);
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok())
    {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    let with_year = format!("{s} {}", now.year());
    if let Some(dt) = YEARLESS_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(&with_year, fmt)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(&with_year, fmt)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
    }) {
        return Ok(dt);
    }

    if let Some(time) = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&s, fmt).ok())
    {
        return Ok(now.date().and_time(time));
    }

    if let Some(caps) = BARE_HOUR_RE.captures(&s) {
        let hour: u32 = caps[1].parse().map_err(|_| unrecognized())?;
        if !(1..=12).contains(&hour) {
            return Err(unrecognized());
        }
        let hour = match (&caps[2], hour) {
            ("am", 12) => 0,
            ("pm", 12) => 12,
            ("pm", h) => h + 12,
            (_, h) => h,
        };
        let time = NaiveTime::from_hms_opt(hour, 0, 0).ok_or_else(unrecognized)?;
        return Ok(now.date().and_time(time));
    }

    Err(unrecognized())
}

fn parse_relative(
    input: &str,
    amount: &str,
    unit: &str,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, DateParseError> {
    let out_of_range = || DateParseError::OutOfRange {
        input: input.to_string(),
    };
    let n: i64 = amount.parse().map_err(|_| out_of_range())?;

    let minutes_per_unit = match unit {
        "minute" | "min" => 1,
        "hour" | "hr" => 60,
        "day" => 60 * 24,
        _ => 60 * 24 * 7,
    };

    if n > MAX_RELATIVE_MINUTES / minutes_per_unit {
        return Err(out_of_range());
    }

    now.checked_sub_signed(Duration::minutes(n * minutes_per_unit))
        .ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        ymd_hms(2020, 3, 15, 14, 30, 0)
    }

    fn ymd_hms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn parse(s: &str) -> NaiveDateTime {
        parse_user_date(s, now()).unwrap_or_else(|e| panic!("{s}: {e}"))
    }

    #[test]
    fn keywords() {
        assert_eq!(parse("now"), now());
        assert_eq!(parse("Today"), ymd_hms(2020, 3, 15, 0, 0, 0));
        assert_eq!(parse("yesterday"), ymd_hms(2020, 3, 14, 0, 0, 0));
    }

    #[test]
    fn relative_times() {
        assert_eq!(parse("30 minutes ago"), ymd_hms(2020, 3, 15, 14, 0, 0));
        assert_eq!(parse("2 hours ago"), ymd_hms(2020, 3, 15, 12, 30, 0));
        assert_eq!(parse("1 day ago"), ymd_hms(2020, 3, 14, 14, 30, 0));
        assert_eq!(parse("1 week ago"), ymd_hms(2020, 3, 8, 14, 30, 0));
    }

    #[test]
    fn relative_time_bounds() {
        let err = parse_user_date("99999999999 weeks ago", now()).unwrap_err();
        assert!(matches!(err, DateParseError::OutOfRange { .. }));
    }

    #[test]
    fn full_datetimes() {
        assert_eq!(parse("2020-01-31 17:00"), ymd_hms(2020, 1, 31, 17, 0, 0));
        assert_eq!(parse("2020-01-31T17:00:05"), ymd_hms(2020, 1, 31, 17, 0, 5));
        assert_eq!(parse("01/31/2020 5:00 PM"), ymd_hms(2020, 1, 31, 17, 0, 0));
        assert_eq!(parse("01-31-2020 17:00:00"), ymd_hms(2020, 1, 31, 17, 0, 0));
        assert_eq!(parse("05:00 PM on Jan 31, 2020"), ymd_hms(2020, 1, 31, 17, 0, 0));
    }

    #[test]
    fn dates_mean_midnight() {
        assert_eq!(parse("2020-01-31"), ymd_hms(2020, 1, 31, 0, 0, 0));
        assert_eq!(parse("Jan 31 2019"), ymd_hms(2019, 1, 31, 0, 0, 0));
        assert_eq!(parse("january 31, 2019"), ymd_hms(2019, 1, 31, 0, 0, 0));
    }

    #[test]
    fn yearless_dates_use_current_year() {
        assert_eq!(parse("dec 31"), ymd_hms(2020, 12, 31, 0, 0, 0));
        assert_eq!(parse("12/31"), ymd_hms(2020, 12, 31, 0, 0, 0));
        assert_eq!(parse("mar 1 9:15"), ymd_hms(2020, 3, 1, 9, 15, 0));
    }

    #[test]
    fn times_of_day_mean_today() {
        assert_eq!(parse("9:05"), ymd_hms(2020, 3, 15, 9, 5, 0));
        assert_eq!(parse("17:00:30"), ymd_hms(2020, 3, 15, 17, 0, 30));
        assert_eq!(parse("5:30pm"), ymd_hms(2020, 3, 15, 17, 30, 0));
        assert_eq!(parse("5:30 PM"), ymd_hms(2020, 3, 15, 17, 30, 0));
        assert_eq!(parse("5pm"), ymd_hms(2020, 3, 15, 17, 0, 0));
        assert_eq!(parse("12am"), ymd_hms(2020, 3, 15, 0, 0, 0));
        assert_eq!(parse("12 pm"), ymd_hms(2020, 3, 15, 12, 0, 0));
    }

    #[test]
    fn garbage_is_rejected() {
        for input in ["", "soon", "13pm", "2020-13-01"] {
            let err = parse_user_date(input, now()).unwrap_err();
            assert!(matches!(err, DateParseError::Unrecognized { .. }), "{input}");
        }
    }
}
