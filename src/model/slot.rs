use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::clock::{ClockStyle, ClockTime};

/// Length of a slot whose end was not visible on the page.
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

/// Display policy applied when a slot is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub clock: ClockStyle,
    /// Length used to synthesize a displayed end time; 0 shows the start only
    pub slot_minutes: u32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            clock: ClockStyle::TwelveHour,
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

/// A selected (date, start, optional end) interval.
///
/// The display strings are fixed when the slot is built, so a slot renders
/// the same way for as long as it lives in the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    id: String,
    date: NaiveDate,
    start: ClockTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<ClockTime>,
    date_display: String,
    start_display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_display: Option<String>,
}

impl Slot {
    pub fn new(
        date: NaiveDate,
        start: ClockTime,
        end: Option<ClockTime>,
        options: &DisplayOptions,
    ) -> Self {
        let shown_end = end.or_else(|| {
            (options.slot_minutes > 0).then(|| start.add_minutes(options.slot_minutes))
        });
        Slot {
            id: slot_id(date, start, end),
            date,
            start,
            end,
            date_display: long_date(date),
            start_display: start.display(options.clock),
            end_display: shown_end.map(|t| t.display(options.clock)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    pub fn end(&self) -> Option<ClockTime> {
        self.end
    }

    /// e.g. `Monday, January 15, 2024`
    pub fn date_display(&self) -> &str {
        &self.date_display
    }

    pub fn start_display(&self) -> &str {
        &self.start_display
    }

    pub fn end_display(&self) -> Option<&str> {
        self.end_display.as_deref()
    }

    /// `start - end`, or just `start` when no end is shown
    pub fn time_range(&self) -> String {
        match &self.end_display {
            Some(end) => format!("{} - {}", self.start_display, end),
            None => self.start_display.clone(),
        }
    }

    /// Chronological ordering key: date, then start time of day
    pub fn sort_key(&self) -> (NaiveDate, ClockTime) {
        (self.date, self.start)
    }
}

/// Deterministic identity: `YYYY-MM-DD-HHMM-HHMM`, end part empty when absent.
pub fn slot_id(date: NaiveDate, start: ClockTime, end: Option<ClockTime>) -> String {
    format!(
        "{}-{}-{}",
        date.format("%Y-%m-%d"),
        start.compact(),
        end.map(ClockTime::compact).unwrap_or_default()
    )
}

/// `Monday, January 15, 2024`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn t(h: u32, m: u32) -> ClockTime {
        ClockTime::new(h, m).unwrap()
    }

    #[test]
    fn id_is_deterministic() {
        let opts = DisplayOptions::default();
        let a = Slot::new(date(2024, 1, 15), t(9, 0), Some(t(9, 30)), &opts);
        let b = Slot::new(date(2024, 1, 15), t(9, 0), Some(t(9, 30)), &opts);
        assert_eq!(a.id(), "2024-01-15-0900-0930");
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn id_without_end_has_empty_tail() {
        assert_eq!(slot_id(date(2024, 1, 16), t(10, 0), None), "2024-01-16-1000-");
    }

    #[test]
    fn display_strings() {
        let slot = Slot::new(
            date(2024, 1, 15),
            t(14, 0),
            Some(t(14, 30)),
            &DisplayOptions::default(),
        );
        assert_eq!(slot.date_display(), "Monday, January 15, 2024");
        assert_eq!(slot.start_display(), "2:00 PM");
        assert_eq!(slot.end_display(), Some("2:30 PM"));
        assert_eq!(slot.time_range(), "2:00 PM - 2:30 PM");
    }

    #[test]
    fn missing_end_is_synthesized_for_display_only() {
        let slot = Slot::new(date(2024, 1, 16), t(10, 0), None, &DisplayOptions::default());
        assert_eq!(slot.end(), None);
        assert_eq!(slot.time_range(), "10:00 AM - 10:30 AM");
    }

    #[test]
    fn zero_length_shows_start_only() {
        let opts = DisplayOptions {
            slot_minutes: 0,
            ..Default::default()
        };
        let slot = Slot::new(date(2024, 1, 16), t(10, 0), None, &opts);
        assert_eq!(slot.end_display(), None);
        assert_eq!(slot.time_range(), "10:00 AM");
    }

    #[test]
    fn twenty_four_hour_display() {
        let opts = DisplayOptions {
            clock: ClockStyle::TwentyFourHour,
            ..Default::default()
        };
        let slot = Slot::new(date(2024, 1, 15), t(9, 0), Some(t(10, 0)), &opts);
        assert_eq!(slot.time_range(), "09:00 - 10:00");
    }

    #[test]
    fn long_date_single_digit_day() {
        assert_eq!(long_date(date(2026, 10, 5)), "Monday, October 5, 2026");
    }

    #[test]
    fn serde_round_trip_keeps_display() {
        let slot = Slot::new(date(2024, 1, 15), t(9, 0), None, &DisplayOptions::default());
        let json = serde_json::to_string(&slot).unwrap();
        assert!(json.contains("\"start\":\"09:00\""));
        assert!(!json.contains("\"end\":"));
        let back: Slot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slot);
    }
}
