use indexmap::IndexMap;

use crate::model::slot::Slot;
use crate::util::unicode::take_graphemes;

const LEAD: &str = "I'm available at the following times:\n\n";

/// Text layout for a rendered selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatPolicy {
    #[default]
    Bullet,
    Numbered,
    Prose,
}

impl FormatPolicy {
    pub const ALL: [FormatPolicy; 3] = [
        FormatPolicy::Bullet,
        FormatPolicy::Numbered,
        FormatPolicy::Prose,
    ];

    /// Strict parse for user input.
    pub fn parse_policy(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bullet" | "bulleted" | "bullets" => Some(FormatPolicy::Bullet),
            "numbered" | "number" => Some(FormatPolicy::Numbered),
            "prose" => Some(FormatPolicy::Prose),
            _ => None,
        }
    }

    /// Lenient lookup: anything unrecognized renders as a bulleted list.
    pub fn from_name(s: &str) -> Self {
        Self::parse_policy(s).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormatPolicy::Bullet => "bullet",
            FormatPolicy::Numbered => "numbered",
            FormatPolicy::Prose => "prose",
        }
    }
}

/// Render the selection as shareable text.
///
/// `slots` must already be in chronological order (as `SelectionStore::list`
/// returns them); groups follow the order dates are first seen.
pub fn format_slots(slots: &[Slot], policy: FormatPolicy) -> String {
    if slots.is_empty() {
        return String::new();
    }
    let groups = group_by_date(slots);
    match policy {
        FormatPolicy::Bullet => bulleted(&groups),
        FormatPolicy::Numbered => numbered(&groups),
        FormatPolicy::Prose => prose(&groups),
    }
}

fn group_by_date(slots: &[Slot]) -> IndexMap<&str, Vec<&Slot>> {
    let mut groups: IndexMap<&str, Vec<&Slot>> = IndexMap::new();
    for slot in slots {
        groups.entry(slot.date_display()).or_default().push(slot);
    }
    groups
}

fn bulleted(groups: &IndexMap<&str, Vec<&Slot>>) -> String {
    let mut out = String::from(LEAD);
    for (date, slots) in groups {
        out.push_str(date);
        out.push('\n');
        for slot in slots {
            out.push_str(&format!("  - {}\n", slot.time_range()));
        }
        out.push('\n');
    }
    out.push_str("Please let me know which time works best for you!");
    out.trim().to_string()
}

fn numbered(groups: &IndexMap<&str, Vec<&Slot>>) -> String {
    let mut out = String::from(LEAD);
    let all = groups.iter().flat_map(|(date, slots)| slots.iter().map(move |s| (date, s)));
    for (n, (date, slot)) in all.enumerate() {
        out.push_str(&format!("{}. {}, {}\n", n + 1, date, slot.time_range()));
    }
    out.push_str("\nPlease let me know which option works best for you!");
    out.trim().to_string()
}

fn prose(groups: &IndexMap<&str, Vec<&Slot>>) -> String {
    let clauses: Vec<String> = groups
        .iter()
        .map(|(date, slots)| {
            let times: Vec<String> = slots
                .iter()
                .map(|s| match s.end_display() {
                    Some(_) => s.time_range(),
                    None => format!("at {}", s.start_display()),
                })
                .collect();
            format!("on {} {}", short_date(date), join_last(&times, " or "))
        })
        .collect();

    format!(
        "I'm available {}. Let me know what works best for you!",
        join_last(&clauses, ", or ")
    )
}

/// Comma-join, with `last_sep` before the final item.
fn join_last(items: &[String], last_sep: &str) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [rest @ .., last] => format!("{}{}{}", rest.join(", "), last_sep, last),
    }
}

/// `Monday, January 15, 2024` → `Monday, Jan 15`. Anything else is returned as is.
pub fn short_date(date_display: &str) -> String {
    let mut parts = date_display.split(", ");
    let (Some(weekday), Some(month_day)) = (parts.next(), parts.next()) else {
        return date_display.to_string();
    };
    let mut md = month_day.split(' ');
    match (md.next(), md.next()) {
        (Some(month), Some(day)) => format!("{}, {} {}", weekday, take_graphemes(month, 3), day),
        _ => date_display.to_string(),
    }
}
