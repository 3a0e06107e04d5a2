use chrono::NaiveDate;
use tracing::debug;

use crate::model::clock::ClockTime;
use crate::model::slot::{DisplayOptions, Slot};
use crate::ops::date_resolver::{ResolveContext, resolve_date};
use crate::page::{NodeId, PageQuery, Selector};
use crate::parse::{parse_label_date, parse_single_time, parse_time, parse_time_range};

/// Height of one grid row when no time labels are visible
pub const ROW_MINUTES: u32 = 30;

const GRID_CONTAINER: Selector<'static> =
    Selector::AnyOf(&[Selector::Role("grid"), Selector::Role("main")]);

/// Start (and, when the page shows one, end) read for an anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeReading {
    pub start: ClockTime,
    pub end: Option<ClockTime>,
}

impl TimeReading {
    fn starting(start: ClockTime) -> Self {
        TimeReading { start, end: None }
    }
}

/// One way of reading a time off the page.
pub type TimeStrategy = fn(&dyn PageQuery, NodeId) -> Option<TimeReading>;

/// Time signals in priority order; the first hit wins.
pub const TIME_STRATEGIES: &[(&str, TimeStrategy)] = &[
    ("time attribute", time_from_attribute),
    ("descriptive label", time_from_label),
    ("grid position", time_from_position),
];

/// Recognize the slot under `anchor`.
///
/// Returns `None` only when no start time can be established; the date
/// always resolves. A missing end is filled in from the configured slot
/// length, so a cell and a label covering the same interval share an id.
pub fn extract_slot(
    page: &dyn PageQuery,
    anchor: NodeId,
    ctx: &ResolveContext,
    display: &DisplayOptions,
) -> Option<Slot> {
    let reading = read_time(page, anchor)?;
    let date = label_date(page, anchor, ctx.today)
        .unwrap_or_else(|| resolve_date(page, anchor, ctx));
    let end = reading.end.or_else(|| {
        (display.slot_minutes > 0).then(|| reading.start.add_minutes(display.slot_minutes))
    });
    let slot = Slot::new(date, reading.start, end, display);
    debug!(id = slot.id(), "extracted slot");
    Some(slot)
}

/// Run the time strategies in order.
pub fn read_time(page: &dyn PageQuery, anchor: NodeId) -> Option<TimeReading> {
    for (name, strategy) in TIME_STRATEGIES {
        if let Some(reading) = strategy(page, anchor) {
            debug!(strategy = name, start = %reading.start, "resolved time");
            return Some(reading);
        }
    }
    debug!("no time signal for anchor");
    None
}

/// Date written in the anchor's descriptive label, if any.
pub fn label_date(page: &dyn PageQuery, anchor: NodeId, today: NaiveDate) -> Option<NaiveDate> {
    let node = page.closest_ancestor(anchor, &Selector::HasAttribute("aria-label"))?;
    parse_label_date(page.attribute(node, "aria-label")?, today)
}

pub fn time_from_attribute(page: &dyn PageQuery, anchor: NodeId) -> Option<TimeReading> {
    let node = page.closest_ancestor(anchor, &Selector::HasAttribute("data-time"))?;
    parse_time(page.attribute(node, "data-time")?).map(TimeReading::starting)
}

/// `aria-label` text: a range sets both ends, a lone time with am/pm sets the start.
pub fn time_from_label(page: &dyn PageQuery, anchor: NodeId) -> Option<TimeReading> {
    let node = page.closest_ancestor(anchor, &Selector::HasAttribute("aria-label"))?;
    let label = page.attribute(node, "aria-label")?;

    if let Some((Some(start), end)) = parse_time_range(label) {
        // an end at or before the start can't be on the same day
        let end = end.filter(|e| *e > start);
        return Some(TimeReading { start, end });
    }
    parse_single_time(label).map(TimeReading::starting)
}

/// Estimate from layout: the nearest time label by vertical position, else
/// the anchor's row number.
pub fn time_from_position(page: &dyn PageQuery, anchor: NodeId) -> Option<TimeReading> {
    page.closest_ancestor(anchor, &GRID_CONTAINER)?;

    let anchor_top = page.bounding_box(anchor).top;
    let mut labels = page.find_by_attribute("data-time");
    labels.extend(
        page.find_by_attribute("data-guidedhelpid")
            .into_iter()
            .filter(|&n| page.attribute(n, "data-guidedhelpid") == Some("time_label")),
    );
    labels.sort();
    labels.dedup();

    let nearest = labels.into_iter().min_by(|&a, &b| {
        let da = (page.bounding_box(a).top - anchor_top).abs();
        let db = (page.bounding_box(b).top - anchor_top).abs();
        da.total_cmp(&db)
    });

    if let Some(label) = nearest {
        let text = match page.attribute(label, "data-time") {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => page.text_content(label),
        };
        if let Some(start) = parse_time(&text) {
            return Some(TimeReading::starting(start));
        }
        debug!(label = %text, "nearest time label unreadable, estimating from row");
    }

    time_from_row(page, anchor)
}

fn time_from_row(page: &dyn PageQuery, anchor: NodeId) -> Option<TimeReading> {
    let row = page.closest_ancestor(anchor, &Selector::Role("row"))?;
    let index = page.find_by_role("row").iter().position(|&r| r == row)?;
    let minutes = u32::try_from(index).ok()?.checked_mul(ROW_MINUTES)?;
    Some(TimeReading::starting(ClockTime::from_minutes(minutes)))
}
