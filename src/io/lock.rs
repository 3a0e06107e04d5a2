use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::debug;

/// Lock file guarding `state.json`, next to it in `.slots/`
pub const LOCK_FILE: &str = "state.lock";

/// How long a command waits for another one to finish with the selection
pub const LOCK_WAIT: Duration = Duration::from_secs(5);

const FIRST_RETRY: Duration = Duration::from_millis(2);
const MAX_RETRY: Duration = Duration::from_millis(50);

/// Exclusive hold on a workspace's selection for one load-toggle-save cycle.
///
/// Two `slots pick` runs racing on the same state would otherwise both read
/// the old selection and the second save would drop the first pick. The hold
/// is an flock on [`LOCK_FILE`] and ends when the value is dropped. The file
/// itself stays: unlinking it would let a waiter lock an inode nobody else
/// can see.
#[derive(Debug)]
pub struct StateLock {
    _file: File,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("cannot open selection lock {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("selection is busy: another slots command held {path} for over {waited:?}")]
    Busy { path: PathBuf, waited: Duration },
    #[error("cannot lock selection at {path}: {source}")]
    Flock { path: PathBuf, source: io::Error },
}

impl StateLock {
    /// Take the selection in `slots_dir`, waiting up to [`LOCK_WAIT`].
    pub fn acquire(slots_dir: &Path) -> Result<Self, LockError> {
        Self::acquire_within(slots_dir, LOCK_WAIT)
    }

    /// Take the selection, retrying with growing pauses until `wait` runs out.
    pub fn acquire_within(slots_dir: &Path, wait: Duration) -> Result<Self, LockError> {
        let path = slots_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let started = Instant::now();
        let mut pause = FIRST_RETRY;
        loop {
            match try_lock(&file) {
                Ok(true) => break,
                Ok(false) => {}
                Err(source) => return Err(LockError::Flock { path, source }),
            }
            let waited = started.elapsed();
            if waited >= wait {
                return Err(LockError::Busy { path, waited: wait });
            }
            std::thread::sleep(pause.min(wait - waited));
            pause = (pause * 2).min(MAX_RETRY);
        }

        let waited = started.elapsed();
        if waited >= FIRST_RETRY {
            debug!(path = %path.display(), ?waited, "selection lock acquired after waiting");
        }
        Ok(StateLock { _file: file })
    }
}

/// Non-blocking exclusive flock. `Ok(false)` when someone else holds it.
#[cfg(unix)]
fn try_lock(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(false),
        _ => Err(err),
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> io::Result<bool> {
    Ok(true)
}
