use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::slot::Slot;

/// Whether interactions on the page are read as slot picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Idle,
    Active,
}

impl SelectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionMode::Idle => "idle",
            SelectionMode::Active => "active",
        }
    }
}

/// Change notification delivered to store listeners
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// The full ordered selection after a mutation
    SlotsChanged(Vec<Slot>),
    ModeChanged(SelectionMode),
}

/// What `toggle` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

type Listener = Box<dyn FnMut(&SelectionEvent)>;

/// Ordered set of selected slots for one page context.
///
/// Slots are unique by id and always sorted by (date, start); slots with the
/// same sort key keep the order they were added in.
#[derive(Default)]
pub struct SelectionStore {
    slots: IndexMap<String, Slot>,
    mode: SelectionMode,
    listeners: Vec<Listener>,
}

impl fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionStore")
            .field("slots", &self.slots)
            .field("mode", &self.mode)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted parts. Duplicate ids keep the first.
    pub fn with_slots(mode: SelectionMode, slots: impl IntoIterator<Item = Slot>) -> Self {
        let mut store = SelectionStore {
            mode,
            ..Default::default()
        };
        for slot in slots {
            if !store.slots.contains_key(slot.id()) {
                store.slots.insert(slot.id().to_string(), slot);
            }
        }
        store.resort();
        store
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode == SelectionMode::Active
    }

    /// Switch mode. Existing slots are kept either way. Returns true if the mode changed.
    pub fn set_mode(&mut self, mode: SelectionMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.emit(SelectionEvent::ModeChanged(mode));
        true
    }

    /// Remove the slot if one with the same id is selected, otherwise add it.
    pub fn toggle(&mut self, slot: Slot) -> Toggled {
        if self.slots.shift_remove(slot.id()).is_some() {
            self.changed();
            Toggled::Removed
        } else {
            self.slots.insert(slot.id().to_string(), slot);
            self.resort();
            self.changed();
            Toggled::Added
        }
    }

    /// Add a slot unless its id is already selected. Returns true if added.
    pub fn insert(&mut self, slot: Slot) -> bool {
        if self.slots.contains_key(slot.id()) {
            return false;
        }
        self.slots.insert(slot.id().to_string(), slot);
        self.resort();
        self.changed();
        true
    }

    /// Remove by id; listeners hear about it only if something was removed.
    pub fn remove(&mut self, id: &str) -> Option<Slot> {
        let removed = self.slots.shift_remove(id)?;
        self.changed();
        Some(removed)
    }

    /// Drop every slot. Always notifies, even when already empty.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.changed();
    }

    /// Snapshot of the selection in order
    pub fn list(&self) -> Vec<Slot> {
        self.slots.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    pub fn get(&self, id: &str) -> Option<&Slot> {
        self.slots.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// e.g. `1 slot selected`, `3 slots selected`
    pub fn status_line(&self) -> String {
        match self.slots.len() {
            1 => "1 slot selected".to_string(),
            n => format!("{} slots selected", n),
        }
    }

    fn resort(&mut self) {
        // stable, so equal keys keep insertion order
        self.slots.sort_by(|_, a, _, b| a.sort_key().cmp(&b.sort_key()));
        debug_assert!(
            self.slots
                .values()
                .zip(self.slots.values().skip(1))
                .all(|(a, b)| a.sort_key() <= b.sort_key())
        );
    }

    fn changed(&mut self) {
        let event = SelectionEvent::SlotsChanged(self.list());
        self.emit(event);
    }

    fn emit(&mut self, event: SelectionEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}
