//! Date parsing and the display formats the sheets use.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Week-commencing display format, e.g. `1 Jan 24`.
pub const WEEK_FORMAT: &str = "%-d %b %y";
/// Last-updated stamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const ISO_FORMAT: &str = "%Y-%m-%d";

const DATE_INPUTS: &[&str] = &["%Y-%m-%d", "%d %b %y", "%d %b %Y", "%d/%m/%Y", "%d %B %Y"];
const TIMESTAMP_INPUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

pub fn format_week(date: NaiveDate) -> String {
    date.format(WEEK_FORMAT).to_string()
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse any of the date shapes found in the sheets. Timestamps yield their date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_INPUTS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| parse_datetime_only(s).map(|ts| ts.date()))
}

/// Parse a submission or update stamp. A bare date is taken as midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    parse_datetime_only(s).or_else(|| {
        DATE_INPUTS
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
            .map(|d| d.and_time(NaiveTime::MIN))
    })
}

fn parse_datetime_only(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_INPUTS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
}

/// Ordinal suffix for a day of the month.
pub fn day_suffix(day: u32) -> &'static str {
    if (4..21).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// The Monday on or before `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn add_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    date + Duration::weeks(weeks)
}
