use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::io::workspace_io::{WorkspaceError, atomic_write};
use crate::model::slot::Slot;
use crate::ops::selection::{SelectionMode, SelectionStore};
use crate::ops::session::{MarkerLayer, Session, SessionOptions};

pub const STATE_FILE: &str = "state.json";

/// Persisted selection for a workspace (written to .slots/state.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub mode: SelectionMode,
    /// Selected slots, in order
    #[serde(default)]
    pub slots: Vec<Slot>,
    /// Highlight markers by slot id
    #[serde(default)]
    pub markers: MarkerLayer,
}

impl SessionState {
    /// Snapshot a session's state for saving
    pub fn capture(session: &Session) -> Self {
        SessionState {
            mode: session.store().mode(),
            slots: session.store().list(),
            markers: session.highlighter().clone(),
        }
    }

    pub fn into_session(self, options: SessionOptions) -> Session {
        let (store, markers) = self.into_parts();
        Session::restore(store, markers, options)
    }

    /// Load this state into a running session, keeping its timers
    pub fn restore_into(self, session: &mut Session) {
        let (store, markers) = self.into_parts();
        session.reset(store, markers);
    }

    fn into_parts(self) -> (SelectionStore, MarkerLayer) {
        (SelectionStore::with_slots(self.mode, self.slots), self.markers)
    }
}

/// Read .slots/state.json. A missing or unreadable file is an empty selection.
pub fn read_session_state(slots_dir: &Path) -> Option<SessionState> {
    let path = slots_dir.join(STATE_FILE);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed session state");
            None
        }
    }
}

/// Write .slots/state.json atomically
pub fn write_session_state(slots_dir: &Path, state: &SessionState) -> Result<(), WorkspaceError> {
    let path = slots_dir.join(STATE_FILE);
    let content = serde_json::to_string_pretty(state)?;
    atomic_write(&path, content.as_bytes()).map_err(|e| WorkspaceError::WriteError {
        path,
        source: e,
    })
}
