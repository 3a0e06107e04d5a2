use std::sync::LazyLock;

use regex::Regex;

use crate::model::clock::ClockTime;

/// `H`, `H:MM`, optionally followed by `am`/`pm`
static TIME_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(am|pm)?").expect("time token pattern")
});

/// `T1 – T2` or `T1 - T2`, each end with an optional meridiem
static TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{1,2}(?::\d{2})?\s*(?:am|pm)?)\s*[–-]\s*(\d{1,2}(?::\d{2})?\s*(?:am|pm)?)",
    )
    .expect("time range pattern")
});

/// A lone time; the meridiem is required so bare day numbers don't read as hours
static SINGLE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}(?::\d{2})?\s*(?:am|pm))").expect("single time pattern")
});

/// Parse the first time token in `text`.
///
/// `12am` is midnight, `12pm` is noon, other `pm` hours add 12, and a token
/// without a meridiem is read as a 24-hour time.
pub fn parse_time(text: &str) -> Option<ClockTime> {
    let caps = TIME_TOKEN.captures(text.trim())?;
    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()).as_deref() {
        Some("pm") if hour != 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        _ => {}
    }
    ClockTime::new(hour, minute)
}

/// Find a `start – end` range in free text and parse both ends.
/// Either end may fail to parse on its own.
pub fn parse_time_range(text: &str) -> Option<(Option<ClockTime>, Option<ClockTime>)> {
    let caps = TIME_RANGE.captures(text)?;
    Some((parse_time(&caps[1]), parse_time(&caps[2])))
}

/// Find a single meridiem-marked time in free text.
pub fn parse_single_time(text: &str) -> Option<ClockTime> {
    let caps = SINGLE_TIME.captures(text)?;
    parse_time(&caps[1])
}
