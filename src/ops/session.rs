//! Command dispatch for one page context.
//!
//! A [`Session`] owns the selection for a page and turns the outside world's
//! commands (mode switches, picks, removals, renders) into store mutations,
//! highlight updates and rendered text.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::config::SlotsConfig;
use crate::model::slot::{DisplayOptions, Slot};
use crate::ops::date_resolver::ResolveContext;
use crate::ops::debounce::{Debounce, RELAYOUT_DELAY};
use crate::ops::format::{FormatPolicy, format_slots};
use crate::ops::keys::{KeyBindings, Shortcut, ShortcutError};
use crate::ops::notice::{NOTICE_TTL, NoticeBoard};
use crate::ops::selection::{SelectionMode, SelectionStore, Toggled};
use crate::ops::slot_extractor::extract_slot;
use crate::page::{BoundingBox, NodeId, PageQuery, Selector};

pub const PAGE_UNAVAILABLE_NOTICE: &str = "Could not connect to the calendar page";

/// Draws and removes the on-page marker for a selected slot
pub trait Highlighter {
    fn add(&mut self, id: &str, rect: BoundingBox);
    fn remove(&mut self, id: &str);
    fn clear(&mut self);
}

/// Marker boxes keyed by slot id, as last drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerLayer {
    markers: IndexMap<String, BoundingBox>,
}

impl MarkerLayer {
    pub fn get(&self, id: &str) -> Option<&BoundingBox> {
        self.markers.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundingBox)> {
        self.markers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl Highlighter for MarkerLayer {
    fn add(&mut self, id: &str, rect: BoundingBox) {
        self.markers.insert(id.to_string(), rect);
    }

    fn remove(&mut self, id: &str) {
        self.markers.shift_remove(id);
    }

    fn clear(&mut self) {
        self.markers.clear();
    }
}

/// Commands accepted from outside the core
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    EnterSelectionMode,
    ExitSelectionMode,
    ToggleAtPoint(NodeId),
    RemoveSlot(String),
    ClearAll,
    GetSlots,
    RenderPreview(FormatPolicy),
    RenderForCopy(FormatPolicy),
}

/// Result of a pick
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Added(Slot),
    Removed(Slot),
    /// Nothing recognizable under the anchor
    Missed,
    /// Selection mode is off
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Mode(SelectionMode),
    Toggle(ToggleOutcome),
    Removed(Option<Slot>),
    Cleared,
    Slots(Vec<Slot>),
    /// Rendered text, or `None` when there is nothing to preview
    Preview(Option<String>),
    Copy(String),
}

/// Error type for session commands
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("could not connect to the calendar page")]
    PageUnavailable,
    #[error("nothing to copy: no slots selected")]
    NothingToCopy,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub display: DisplayOptions,
    pub notice_ttl: Duration,
    pub relayout_delay: Duration,
    pub keys: KeyBindings,
    /// Fixed "today" for date inference; the local date when unset
    pub today: Option<NaiveDate>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            display: DisplayOptions::default(),
            notice_ttl: NOTICE_TTL,
            relayout_delay: RELAYOUT_DELAY,
            keys: KeyBindings::default(),
            today: None,
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &SlotsConfig) -> Result<Self, ShortcutError> {
        Ok(SessionOptions {
            display: config.display.options(),
            notice_ttl: Duration::from_millis(config.notices.timeout_ms),
            keys: KeyBindings::from_config(&config.keys)?,
            ..Default::default()
        })
    }

    fn resolve_context(&self) -> ResolveContext {
        match self.today {
            Some(today) => ResolveContext::on(today),
            None => ResolveContext::now(),
        }
    }
}

/// Selection state plus its collaborators for one page context
#[derive(Debug)]
pub struct Session<H: Highlighter = MarkerLayer> {
    store: SelectionStore,
    highlighter: H,
    notices: NoticeBoard,
    relayout: Debounce,
    options: SessionOptions,
}

impl<H: Highlighter + Default> Session<H> {
    pub fn new(options: SessionOptions) -> Self {
        Self::restore(SelectionStore::new(), H::default(), options)
    }
}

impl<H: Highlighter> Session<H> {
    /// Resume with existing state (e.g. loaded from disk)
    pub fn restore(store: SelectionStore, highlighter: H, options: SessionOptions) -> Self {
        Session {
            store,
            highlighter,
            notices: NoticeBoard::new(options.notice_ttl),
            relayout: Debounce::new(options.relayout_delay),
            options,
        }
    }

    /// Run one command to completion.
    ///
    /// `page` is the current page, or `None` when it can't be reached; only
    /// picking needs it.
    pub fn handle(
        &mut self,
        command: Command,
        page: Option<&dyn PageQuery>,
    ) -> Result<Response, SessionError> {
        debug!(?command, "handling command");
        match command {
            Command::EnterSelectionMode => Ok(self.set_mode(SelectionMode::Active)),
            Command::ExitSelectionMode => Ok(self.set_mode(SelectionMode::Idle)),
            Command::ToggleAtPoint(anchor) => self.toggle_at(anchor, page).map(Response::Toggle),
            Command::RemoveSlot(id) => {
                let removed = self.store.remove(&id);
                if removed.is_some() {
                    self.highlighter.remove(&id);
                    info!(%id, "removed slot");
                }
                Ok(Response::Removed(removed))
            }
            Command::ClearAll => {
                self.store.clear();
                self.highlighter.clear();
                info!("cleared selection");
                Ok(Response::Cleared)
            }
            Command::GetSlots => Ok(Response::Slots(self.store.list())),
            Command::RenderPreview(policy) => {
                if self.store.is_empty() {
                    return Ok(Response::Preview(None));
                }
                Ok(Response::Preview(Some(format_slots(&self.store.list(), policy))))
            }
            Command::RenderForCopy(policy) => {
                if self.store.is_empty() {
                    return Err(SessionError::NothingToCopy);
                }
                Ok(Response::Copy(format_slots(&self.store.list(), policy)))
            }
        }
    }

    /// Keyboard shortcut. Returns the new mode when the key did something.
    pub fn handle_key(&mut self, key: &Shortcut) -> Option<SelectionMode> {
        let target = if *key == self.options.keys.toggle {
            match self.store.mode() {
                SelectionMode::Idle => SelectionMode::Active,
                SelectionMode::Active => SelectionMode::Idle,
            }
        } else if *key == self.options.keys.exit && self.store.is_active() {
            SelectionMode::Idle
        } else {
            return None;
        };
        self.set_mode(target);
        Some(target)
    }

    /// Scroll, resize or page change: marker positions are now stale.
    pub fn layout_changed(&mut self, now: Instant) {
        self.relayout.trigger(now);
    }

    /// Advance timers. Returns true when stale markers were just cleared;
    /// the selection itself is untouched.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.relayout.poll(now) {
            self.highlighter.clear();
            debug!("layout settled, cleared markers");
            return true;
        }
        false
    }

    /// Time until a pending relayout settles; `None` when nothing moved.
    pub fn relayout_remaining(&self, now: Instant) -> Option<Duration> {
        self.relayout.remaining(now)
    }

    /// Swap in selection state saved elsewhere. Timers and notices carry over.
    pub fn reset(&mut self, store: SelectionStore, highlighter: H) {
        self.store = store;
        self.highlighter = highlighter;
    }

    /// Notices still showing at `now`
    pub fn active_notices(&mut self, now: Instant) -> Vec<&str> {
        self.notices.active(now)
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn highlighter(&self) -> &H {
        &self.highlighter
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn set_mode(&mut self, mode: SelectionMode) -> Response {
        if self.store.set_mode(mode) {
            info!(mode = mode.as_str(), "selection mode changed");
        }
        Response::Mode(mode)
    }

    fn toggle_at(
        &mut self,
        anchor: NodeId,
        page: Option<&dyn PageQuery>,
    ) -> Result<ToggleOutcome, SessionError> {
        if !self.store.is_active() {
            debug!("selection mode off, ignoring pick");
            return Ok(ToggleOutcome::Ignored);
        }
        let Some(page) = page else {
            self.notices.push(PAGE_UNAVAILABLE_NOTICE, Instant::now());
            return Err(SessionError::PageUnavailable);
        };

        let ctx = self.options.resolve_context();
        let Some(slot) = extract_slot(page, anchor, &ctx, &self.options.display) else {
            debug!(?anchor, "nothing recognizable under anchor");
            return Ok(ToggleOutcome::Missed);
        };

        match self.store.toggle(slot.clone()) {
            Toggled::Added => {
                let rect = page.bounding_box(highlight_target(page, anchor));
                self.highlighter.add(slot.id(), rect);
                info!(id = slot.id(), "added slot");
                Ok(ToggleOutcome::Added(slot))
            }
            Toggled::Removed => {
                self.highlighter.remove(slot.id());
                info!(id = slot.id(), "removed slot");
                Ok(ToggleOutcome::Removed(slot))
            }
        }
    }
}

const HIGHLIGHT_TARGETS: [Selector<'static>; 2] =
    [Selector::Role("gridcell"), Selector::Role("button")];

/// Element whose box is marked for a pick: the enclosing cell or button, else the anchor.
fn highlight_target(page: &dyn PageQuery, anchor: NodeId) -> NodeId {
    HIGHLIGHT_TARGETS
        .iter()
        .find_map(|sel| page.closest_ancestor(anchor, sel))
        .unwrap_or(anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::clock::ClockTime;
    use crate::page::{ElementSpec, Page, PageSnapshot};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn session() -> Session {
        Session::new(SessionOptions {
            today: Some(today()),
            ..Default::default()
        })
    }

    fn page() -> Page {
        let cell = |id: &str, time: &str, left: f64| {
            ElementSpec::new("div")
                .with_attr("role", "gridcell")
                .with_attr("id", id)
                .with_attr("data-time", time)
                .with_rect(200.0, left, 100.0, 50.0)
                .with_child(ElementSpec::new("span").with_attr("id", &format!("{id}-label")))
        };
        Page::from_snapshot(PageSnapshot {
            location: "https://cal.example.com/r/week/2024/1/15".into(),
            root: ElementSpec::new("body").with_children([
                ElementSpec::new("div")
                    .with_attr("role", "row")
                    .with_children([cell("a", "9am", 0.0), cell("b", "2pm", 100.0)]),
                ElementSpec::new("div").with_attr("id", "blank"),
            ]),
        })
    }

    fn pick(s: &mut Session, p: &Page, id: &str) -> ToggleOutcome {
        let anchor = p.find_by_id(id).unwrap();
        match s.handle(Command::ToggleAtPoint(anchor), Some(p)).unwrap() {
            Response::Toggle(outcome) => outcome,
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn picks_ignored_while_idle() {
        let mut s = session();
        let p = page();
        assert_eq!(pick(&mut s, &p, "a"), ToggleOutcome::Ignored);
        assert!(s.store().is_empty());
    }

    #[test]
    fn pick_adds_and_marks_the_cell() {
        let mut s = session();
        let p = page();
        s.handle(Command::EnterSelectionMode, None).unwrap();
        let ToggleOutcome::Added(slot) = pick(&mut s, &p, "a-label") else {
            panic!("expected a new slot");
        };
        assert_eq!(slot.start(), ClockTime::new(9, 0).unwrap());
        assert_eq!(slot.date(), today());
        let marker = s.highlighter().get(slot.id()).unwrap();
        assert_eq!(marker.left, 0.0);
        assert_eq!(marker.width, 100.0);
    }

    #[test]
    fn picking_twice_removes_slot_and_marker() {
        let mut s = session();
        let p = page();
        s.handle(Command::EnterSelectionMode, None).unwrap();
        pick(&mut s, &p, "b");
        assert!(matches!(pick(&mut s, &p, "b"), ToggleOutcome::Removed(_)));
        assert!(s.store().is_empty());
        assert!(s.highlighter().is_empty());
    }

    #[test]
    fn unrecognized_anchor_is_a_miss() {
        let mut s = session();
        let p = page();
        s.handle(Command::EnterSelectionMode, None).unwrap();
        assert_eq!(pick(&mut s, &p, "blank"), ToggleOutcome::Missed);
        assert!(s.store().is_empty());
    }

    #[test]
    fn handle_from_another_page_is_a_miss() {
        let mut s = session();
        let p = page();
        s.handle(Command::EnterSelectionMode, None).unwrap();
        assert_eq!(
            s.handle(Command::ToggleAtPoint(NodeId(9999)), Some(&p)).unwrap(),
            Response::Toggle(ToggleOutcome::Missed)
        );
        assert!(s.store().is_empty());
    }

    #[test]
    fn missing_page_is_reported_without_mutation() {
        let mut s = session();
        s.handle(Command::EnterSelectionMode, None).unwrap();
        let err = s.handle(Command::ToggleAtPoint(NodeId(1)), None).unwrap_err();
        assert_eq!(err, SessionError::PageUnavailable);
        assert!(s.store().is_empty());
        assert_eq!(s.active_notices(Instant::now()), vec![PAGE_UNAVAILABLE_NOTICE]);
    }

    #[test]
    fn notices_respect_the_configured_ttl() {
        let mut s: Session = Session::new(SessionOptions {
            notice_ttl: Duration::ZERO,
            ..Default::default()
        });
        s.handle(Command::EnterSelectionMode, None).unwrap();
        assert!(s.handle(Command::ToggleAtPoint(NodeId(1)), None).is_err());
        assert!(s.active_notices(Instant::now()).is_empty());
    }

    #[test]
    fn leaving_selection_mode_keeps_slots() {
        let mut s = session();
        let p = page();
        s.handle(Command::EnterSelectionMode, None).unwrap();
        pick(&mut s, &p, "a");
        assert_eq!(
            s.handle(Command::ExitSelectionMode, None).unwrap(),
            Response::Mode(SelectionMode::Idle)
        );
        assert_eq!(s.store().len(), 1);
    }

    #[test]
    fn remove_and_clear_drop_markers() {
        let mut s = session();
        let p = page();
        s.handle(Command::EnterSelectionMode, None).unwrap();
        let ToggleOutcome::Added(a) = pick(&mut s, &p, "a") else {
            panic!("expected a new slot");
        };
        pick(&mut s, &p, "b");
        let removed = s.handle(Command::RemoveSlot(a.id().to_string()), None).unwrap();
        assert_eq!(removed, Response::Removed(Some(a.clone())));
        assert!(s.highlighter().get(a.id()).is_none());
        assert_eq!(s.highlighter().len(), 1);
        assert_eq!(
            s.handle(Command::RemoveSlot("nope".into()), None).unwrap(),
            Response::Removed(None)
        );
        s.handle(Command::ClearAll, None).unwrap();
        assert!(s.store().is_empty());
        assert!(s.highlighter().is_empty());
    }

    #[test]
    fn preview_and_copy() {
        let mut s = session();
        let p = page();
        assert_eq!(
            s.handle(Command::RenderPreview(FormatPolicy::Bullet), None).unwrap(),
            Response::Preview(None)
        );
        assert_eq!(
            s.handle(Command::RenderForCopy(FormatPolicy::Bullet), None).unwrap_err(),
            SessionError::NothingToCopy
        );
        s.handle(Command::EnterSelectionMode, None).unwrap();
        pick(&mut s, &p, "b");
        let copied = s.handle(Command::RenderForCopy(FormatPolicy::Numbered), None);
        let Ok(Response::Copy(text)) = copied else {
            panic!("expected copy text");
        };
        assert!(text.contains("1. Monday, January 15, 2024, 2:00 PM - 2:30 PM"));
    }

    #[test]
    fn shortcuts_switch_mode() {
        let mut s = session();
        let toggle: Shortcut = "alt+s".parse().unwrap();
        let esc: Shortcut = "esc".parse().unwrap();
        assert_eq!(s.handle_key(&esc), None);
        assert_eq!(s.handle_key(&toggle), Some(SelectionMode::Active));
        assert_eq!(s.handle_key(&esc), Some(SelectionMode::Idle));
        assert_eq!(s.handle_key(&toggle), Some(SelectionMode::Active));
        assert_eq!(s.handle_key(&toggle), Some(SelectionMode::Idle));
        assert_eq!(s.handle_key(&Shortcut::key("x")), None);
    }

    #[test]
    fn layout_change_clears_markers_after_quiet_period() {
        let mut s = session();
        let p = page();
        s.handle(Command::EnterSelectionMode, None).unwrap();
        pick(&mut s, &p, "a");
        let t0 = Instant::now();
        s.layout_changed(t0);
        assert!(!s.tick(t0 + Duration::from_millis(100)));
        assert_eq!(s.highlighter().len(), 1);
        assert_eq!(
            s.relayout_remaining(t0 + Duration::from_millis(150)),
            Some(Duration::from_millis(50))
        );
        assert!(s.tick(t0 + Duration::from_millis(200)));
        assert!(s.highlighter().is_empty());
        assert_eq!(s.store().len(), 1);
        assert_eq!(s.relayout_remaining(t0 + Duration::from_millis(300)), None);
    }

    #[test]
    fn reset_keeps_a_pending_relayout() {
        let mut s = session();
        let p = page();
        let t0 = Instant::now();
        s.layout_changed(t0);

        let mut fresh = session();
        fresh.handle(Command::EnterSelectionMode, None).unwrap();
        pick(&mut fresh, &p, "b");
        let store = SelectionStore::with_slots(fresh.store().mode(), fresh.store().list());
        s.reset(store, fresh.highlighter().clone());
        assert_eq!(s.highlighter().len(), 1);

        assert!(s.tick(t0 + Duration::from_millis(200)));
        assert!(s.highlighter().is_empty());
        assert_eq!(s.store().len(), 1);
    }

    #[test]
    fn options_follow_config() {
        let mut config = SlotsConfig::default();
        config.notices.timeout_ms = 500;
        config.display.slot_minutes = 0;
        let opts = SessionOptions::from_config(&config).unwrap();
        assert_eq!(opts.notice_ttl, Duration::from_millis(500));
        assert_eq!(opts.display.slot_minutes, 0);

        config.keys.toggle = "alt+".into();
        assert!(SessionOptions::from_config(&config).is_err());
    }
}
