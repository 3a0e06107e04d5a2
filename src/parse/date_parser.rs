use std::sync::LazyLock;

use chrono::{Datelike, Months, NaiveDate};
use regex::Regex;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// How far (in days) a header's day-of-month may sit from today's before it
/// is taken to belong to the neighbouring month.
const MONTH_WINDOW_DAYS: i64 = 15;

/// `YYYY-MM-DD` or `YYYYMMDD`
static DATE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-?(\d{2})-?(\d{2})").expect("date marker pattern"));

/// `YYYY/M/D` inside a URL path
static LOCATION_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})/(\d{1,2})/(\d{1,2})").expect("location date pattern"));

static DAY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("day number pattern"));

/// `Weekday[,] Month Day[, Year]`
static LABEL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)[,\s]+(\w+)\s+(\d{1,2})(?:[,\s]+(\d{4}))?",
    )
    .expect("label date pattern")
});

/// `Month Day[,] Year` anywhere in a heading
static HEADING_MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]+)\.?\s+(\d{1,2}),?\s+(\d{4})\b").expect("heading date pattern")
});

/// `Month Day – Day, Year` (a week heading); the first day wins
static HEADING_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]+)\.?\s+(\d{1,2})\s*[–-][^0-9]*\d{1,2},?\s+(\d{4})\b")
        .expect("heading range pattern")
});

/// `Month Year` (a month heading)
static HEADING_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([a-z]+)\.?\s+(\d{4})\s*$").expect("heading month pattern")
});

/// Month number (1-based) for a month name or any prefix of one.
pub fn month_from_prefix(token: &str) -> Option<u32> {
    if token.is_empty() {
        return None;
    }
    let token = token.to_lowercase();
    MONTHS
        .iter()
        .position(|m| m.starts_with(&token))
        .map(|i| i as u32 + 1)
}

/// Parse a machine-readable date attribute (`2024-01-15`, `20240115`).
pub fn parse_date_marker(value: &str) -> Option<NaiveDate> {
    let caps = DATE_MARKER.captures(value)?;
    ymd(&caps[1], &caps[2], &caps[3])
}

/// Parse a `YYYY/M/D` date embedded in a location such as
/// `https://calendar.example.com/r/week/2024/1/15`.
pub fn parse_location_date(location: &str) -> Option<NaiveDate> {
    let caps = LOCATION_DATE.captures(location)?;
    ymd(&caps[1], &caps[2], &caps[3])
}

/// Parse a column header like `Mon 15`.
///
/// Only the day of month is visible, so month and year come from `today`:
/// a day more than 15 days before today's day-of-month belongs to next
/// month, one more than 15 days after it to the previous month.
pub fn parse_header_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let day: u32 = DAY_NUMBER.find(text)?.as_str().parse().ok()?;
    let today_day = i64::from(today.day());
    let first = today.with_day(1)?;
    let month_start = if i64::from(day) < today_day - MONTH_WINDOW_DAYS {
        first.checked_add_months(Months::new(1))?
    } else if i64::from(day) > today_day + MONTH_WINDOW_DAYS {
        first.checked_sub_months(Months::new(1))?
    } else {
        first
    };
    month_start.with_day(day)
}

/// Parse `Monday, January 15[, 2024]` out of a descriptive label.
/// The year defaults to `today`'s.
pub fn parse_label_date(label: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = LABEL_DATE.captures(label)?;
    let month = month_from_prefix(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = match caps.get(3) {
        Some(y) => y.as_str().parse().ok()?,
        None => today.year(),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a page heading written in natural language.
///
/// Understands full dates (`January 15, 2024`, `Monday, January 15, 2024`,
/// `2024-01-15`, `1/15/2024`), week headings (`Oct 12 – 18, 2026` gives the
/// first day) and month headings (`January 2024` gives the first of the month).
pub fn parse_heading_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    const FORMATS: [&str; 7] = [
        "%A, %B %d, %Y",
        "%B %d, %Y",
        "%B %d %Y",
        "%d %B %Y",
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%Y/%m/%d",
    ];
    if let Some(date) = FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }

    for re in [&*HEADING_RANGE, &*HEADING_MONTH_DAY_YEAR] {
        if let Some(caps) = re.captures(text)
            && let Some(month) = month_from_prefix(&caps[1])
        {
            let day: u32 = caps[2].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    let caps = HEADING_MONTH_YEAR.captures(text)?;
    let month = month_from_prefix(&caps[1])?;
    let year: i32 = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn ymd(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}
