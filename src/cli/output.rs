use serde::Serialize;

use crate::model::slot::Slot;
use crate::ops::selection::{SelectionMode, SelectionStore};
use crate::ops::session::ToggleOutcome;
use crate::util::unicode::{display_width, pad_to_width, truncate_to_width};

/// Widest a date cell may get in the slot table
const MAX_DATE_CELLS: usize = 32;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SlotJson {
    pub id: String,
    pub date: String,
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub display: String,
}

#[derive(Serialize)]
pub struct StatusJson {
    pub mode: SelectionMode,
    pub count: usize,
    pub status: String,
}

#[derive(Serialize)]
pub struct PickJson {
    /// added, removed, missed or ignored
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<SlotJson>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct RenderJson {
    pub format: &'static str,
    /// Absent when nothing is selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn slot_to_json(slot: &Slot) -> SlotJson {
    SlotJson {
        id: slot.id().to_string(),
        date: slot.date().format("%Y-%m-%d").to_string(),
        start: slot.start().to_string(),
        end: slot.end().map(|t| t.to_string()),
        display: format!("{}, {}", slot.date_display(), slot.time_range()),
    }
}

pub fn status_to_json(store: &SelectionStore) -> StatusJson {
    StatusJson {
        mode: store.mode(),
        count: store.len(),
        status: store.status_line(),
    }
}

pub fn pick_to_json(outcome: &ToggleOutcome, count: usize) -> PickJson {
    let (name, slot) = match outcome {
        ToggleOutcome::Added(s) => ("added", Some(slot_to_json(s))),
        ToggleOutcome::Removed(s) => ("removed", Some(slot_to_json(s))),
        ToggleOutcome::Missed => ("missed", None),
        ToggleOutcome::Ignored => ("ignored", None),
    };
    PickJson {
        outcome: name,
        slot,
        count,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One line describing what a pick did
pub fn format_pick(outcome: &ToggleOutcome) -> String {
    match outcome {
        ToggleOutcome::Added(s) => {
            format!("+ {}  {}, {}", s.id(), s.date_display(), s.time_range())
        }
        ToggleOutcome::Removed(s) => {
            format!("- {}  {}, {}", s.id(), s.date_display(), s.time_range())
        }
        ToggleOutcome::Missed => "no time slot recognized at that point".to_string(),
        ToggleOutcome::Ignored => "selection mode is off (run `slots mode on`)".to_string(),
    }
}

/// Aligned table: id, date, time range
pub fn format_slot_table(slots: &[Slot]) -> Vec<String> {
    let dates: Vec<String> = slots
        .iter()
        .map(|s| truncate_to_width(s.date_display(), MAX_DATE_CELLS))
        .collect();
    let id_width = slots.iter().map(|s| display_width(s.id())).max().unwrap_or(0);
    let date_width = dates.iter().map(|d| display_width(d)).max().unwrap_or(0);

    slots
        .iter()
        .zip(&dates)
        .map(|(slot, date)| {
            format!(
                "{}  {}  {}",
                pad_to_width(slot.id(), id_width),
                pad_to_width(date, date_width),
                slot.time_range()
            )
        })
        .collect()
}

pub fn format_status(store: &SelectionStore) -> String {
    let mode = match store.mode() {
        SelectionMode::Active => "on",
        SelectionMode::Idle => "off",
    };
    format!("selection mode: {}\n{}", mode, store.status_line())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::clock::ClockTime;
    use crate::model::slot::DisplayOptions;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn slot(m: u32, d: u32, h: u32, end: Option<u32>) -> Slot {
        Slot::new(
            NaiveDate::from_ymd_opt(2024, m, d).unwrap(),
            ClockTime::new(h, 0).unwrap(),
            end.map(|e| ClockTime::new(e, 0).unwrap()),
            &DisplayOptions::default(),
        )
    }

    #[test]
    fn table_columns_align() {
        let lines = format_slot_table(&[slot(5, 3, 9, Some(10)), slot(9, 18, 14, None)]);
        assert_eq!(
            lines,
            vec![
                "2024-05-03-0900-1000  Friday, May 3, 2024            9:00 AM - 10:00 AM",
                "2024-09-18-1400-      Wednesday, September 18, 2024  2:00 PM - 2:30 PM",
            ]
        );
    }

    #[test]
    fn empty_table() {
        assert!(format_slot_table(&[]).is_empty());
    }

    #[test]
    fn slot_json_shape() {
        let json = serde_json::to_value(slot_to_json(&slot(1, 16, 10, None))).unwrap();
        assert_eq!(json["id"], "2024-01-16-1000-");
        assert_eq!(json["date"], "2024-01-16");
        assert_eq!(json["start"], "10:00");
        assert!(json.get("end").is_none());
        assert_eq!(json["display"], "Tuesday, January 16, 2024, 10:00 AM - 10:30 AM");
    }

    #[test]
    fn pick_json_outcomes() {
        let json = serde_json::to_value(pick_to_json(&ToggleOutcome::Missed, 2)).unwrap();
        assert_eq!(json, serde_json::json!({ "outcome": "missed", "count": 2 }));
    }

    #[test]
    fn status_text() {
        let store = SelectionStore::new();
        assert_eq!(format_status(&store), "selection mode: off\n0 slots selected");
    }
}
