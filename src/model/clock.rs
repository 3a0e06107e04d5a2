use std::fmt;

use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// How times are rendered for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockStyle {
    /// `9:00 AM`
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    /// `09:00`
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl ClockStyle {
    pub fn parse_style(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "12h" | "12" => Some(ClockStyle::TwelveHour),
            "24h" | "24" => Some(ClockStyle::TwentyFourHour),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClockStyle::TwelveHour => "12h",
            ClockStyle::TwentyFourHour => "24h",
        }
    }
}

/// A time of day with minute precision (hour 0–23, minute 0–59).
///
/// Ordering follows minutes since midnight. Serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime { hour: 0, minute: 0 };

    /// Build a time, rejecting out-of-range fields.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(ClockTime {
                hour: hour as u8,
                minute: minute as u8,
            })
        } else {
            None
        }
    }

    /// Build a time from minutes since midnight, wrapping past the end of the day.
    pub fn from_minutes(total: u32) -> Self {
        let total = total % MINUTES_PER_DAY;
        ClockTime {
            hour: (total / 60) as u8,
            minute: (total % 60) as u8,
        }
    }

    pub fn hour(self) -> u32 {
        u32::from(self.hour)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.minute)
    }

    pub fn minutes_since_midnight(self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    /// Add minutes; the hour wraps within the same day (23:45 + 30 → 00:15).
    pub fn add_minutes(self, minutes: u32) -> Self {
        Self::from_minutes(self.minutes_since_midnight() + minutes)
    }

    /// `HHMM`, used in slot identities
    pub fn compact(self) -> String {
        format!("{:02}{:02}", self.hour, self.minute)
    }

    /// Human-facing rendering in the given style
    pub fn display(self, style: ClockStyle) -> String {
        match style {
            ClockStyle::TwelveHour => {
                let meridiem = if self.hour >= 12 { "PM" } else { "AM" };
                let hour = match self.hour % 12 {
                    0 => 12,
                    h => h,
                };
                format!("{}:{:02} {}", hour, self.minute, meridiem)
            }
            ClockStyle::TwentyFourHour => format!("{:02}:{:02}", self.hour, self.minute),
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> String {
        t.to_string()
    }
}

impl TryFrom<String> for ClockTime {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got \"{}\"", s))?;
        let hour = h.parse().map_err(|_| format!("bad hour in \"{}\"", s))?;
        let minute = m.parse().map_err(|_| format!("bad minute in \"{}\"", s))?;
        ClockTime::new(hour, minute).ok_or_else(|| format!("time out of range: \"{}\"", s))
    }
}
