//! Recognition and rendering against the captured week view in
//! `tests/fixtures/week.json`, driven through the library API.

use std::path::Path;

use chrono::NaiveDate;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use slotpick::model::{ClockStyle, ClockTime, DisplayOptions};
use slotpick::ops::date_resolver::{ResolveContext, resolve_date};
use slotpick::ops::format::{FormatPolicy, format_slots};
use slotpick::ops::session::{Command, Response, Session, SessionOptions, ToggleOutcome};
use slotpick::ops::slot_extractor::{extract_slot, read_time};
use slotpick::page::{ElementSpec, Page, PageQuery, PageSnapshot};

fn week() -> Page {
    Page::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/week.json")).unwrap()
}

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn ctx() -> ResolveContext {
    ResolveContext::on(jan(15))
}

#[test]
fn cells_take_their_column_date() {
    let page = week();
    for (id, day) in [("mon-9", 15), ("tue-10", 16), ("wed-9", 17)] {
        let anchor = page.find_by_id(id).unwrap();
        assert_eq!(resolve_date(&page, anchor, &ctx()), jan(day), "{id}");
    }
}

#[test]
fn cells_take_the_nearest_time_label() {
    let page = week();
    let time = |id: &str| read_time(&page, page.find_by_id(id).unwrap()).unwrap().start;
    assert_eq!(time("mon-9"), ClockTime::new(9, 0).unwrap());
    assert_eq!(time("wed-10"), ClockTime::new(10, 0).unwrap());
}

#[test]
fn event_label_wins_over_layout() {
    let page = week();
    let anchor = page.find_by_id("evt-title").unwrap();
    let slot = extract_slot(&page, anchor, &ctx(), &DisplayOptions::default()).unwrap();
    assert_eq!(slot.id(), "2024-01-15-1400-1500");
    assert_eq!(slot.time_range(), "2:00 PM - 3:00 PM");
}

#[test]
fn hit_test_finds_the_cell_under_a_point() {
    let page = week();
    let anchor = page.hit_test(250.0, 210.0).unwrap();
    assert_eq!(page.attribute(anchor, "id"), Some("tue-9"));
    let slot = extract_slot(&page, anchor, &ctx(), &DisplayOptions::default()).unwrap();
    assert_eq!(slot.id(), "2024-01-16-0900-0930");
}

#[test]
fn label_for_a_picked_cell_toggles_it_off() {
    let grid = week();
    let agenda = Page::from_snapshot(PageSnapshot {
        location: "https://calendar.example.com/calendar/r/agenda/2024/1/15".into(),
        root: ElementSpec::new("body").with_child(
            ElementSpec::new("div")
                .with_attr("role", "button")
                .with_attr("id", "standup")
                .with_attr("aria-label", "Monday, January 15, 2024 9:00 AM – 9:30 AM"),
        ),
    });
    let mut session: Session = Session::new(SessionOptions {
        today: Some(jan(15)),
        ..Default::default()
    });
    session.handle(Command::EnterSelectionMode, None).unwrap();

    let cell = grid.find_by_id("mon-9").unwrap();
    let added = session.handle(Command::ToggleAtPoint(cell), Some(&grid)).unwrap();
    let Response::Toggle(ToggleOutcome::Added(slot)) = added else {
        panic!("expected the cell to be added, got {added:?}");
    };
    assert_eq!(slot.id(), "2024-01-15-0900-0930");
    assert_eq!(session.store().len(), 1);

    let label = agenda.find_by_id("standup").unwrap();
    let removed = session.handle(Command::ToggleAtPoint(label), Some(&agenda)).unwrap();
    assert_eq!(removed, Response::Toggle(ToggleOutcome::Removed(slot)));
    assert!(session.store().is_empty());
    assert!(session.highlighter().is_empty());
}

#[test]
fn twenty_four_hour_display() {
    let page = week();
    let display = DisplayOptions {
        clock: ClockStyle::TwentyFourHour,
        slot_minutes: 0,
    };
    let anchor = page.find_by_id("mon-9").unwrap();
    let slot = extract_slot(&page, anchor, &ctx(), &display).unwrap();
    assert_eq!(slot.time_range(), "09:00");
}

#[test]
fn session_flow_renders_every_layout() {
    let page = week();
    let mut session: Session = Session::new(SessionOptions {
        today: Some(jan(15)),
        ..Default::default()
    });
    session.handle(Command::EnterSelectionMode, None).unwrap();

    for id in ["wed-10", "mon-9", "evt", "mon-10"] {
        let anchor = page.find_by_id(id).unwrap();
        let response = session
            .handle(Command::ToggleAtPoint(anchor), Some(&page))
            .unwrap();
        assert!(
            matches!(response, Response::Toggle(ToggleOutcome::Added(_))),
            "{id}: {response:?}"
        );
    }
    assert_eq!(session.store().status_line(), "4 slots selected");
    assert_eq!(session.highlighter().len(), 4);

    let slots = session.store().list();
    assert_snapshot!(format_slots(&slots, FormatPolicy::Bullet), @r"
I'm available at the following times:

Monday, January 15, 2024
  - 9:00 AM - 9:30 AM
  - 10:00 AM - 10:30 AM
  - 2:00 PM - 3:00 PM

Wednesday, January 17, 2024
  - 10:00 AM - 10:30 AM

Please let me know which time works best for you!
");
    assert_eq!(
        format_slots(&slots, FormatPolicy::Prose),
        "I'm available on Monday, Jan 15 9:00 AM - 9:30 AM, 10:00 AM - 10:30 AM or \
         2:00 PM - 3:00 PM, or on Wednesday, Jan 17 10:00 AM - 10:30 AM. \
         Let me know what works best for you!"
    );
}
