use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the file watcher to the watch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotEvent {
    /// The page snapshot was rewritten: its layout may have moved.
    Changed(PathBuf),
    /// The page snapshot went away.
    Removed(PathBuf),
}

/// Watches one page snapshot file for changes.
pub struct SnapshotWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<SnapshotEvent>,
}

impl SnapshotWatcher {
    /// Start watching `snapshot`. The parent directory is watched so that
    /// editors and capture tools that replace the file are still seen.
    pub fn start(snapshot: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let target = snapshot.to_path_buf();
        let file_name = target.file_name().map(|n| n.to_os_string());
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };
                let touches_target = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if !touches_target {
                    return;
                }
                let msg = match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) => {
                        SnapshotEvent::Changed(target.clone())
                    }
                    EventKind::Remove(_) => SnapshotEvent::Removed(target.clone()),
                    _ => return,
                };
                let _ = tx.send(msg);
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(SnapshotWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Wait up to `timeout` for the next event.
    pub fn wait(&self, timeout: Duration) -> Option<SnapshotEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}
