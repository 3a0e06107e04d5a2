use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::config::SlotsConfig;

/// Name of the per-workspace state directory
pub const SLOTS_DIR: &str = ".slots";
pub const CONFIG_FILE: &str = "config.toml";

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a slots workspace: no .slots/ directory found (run `slots init`)")]
    NotAWorkspace,
    #[error("workspace already initialized at {0} (use --force to overwrite)")]
    AlreadyInitialized(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("could not serialize session state: {0}")]
    StateError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A discovered workspace and its parsed configuration
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub slots_dir: PathBuf,
    pub config: SlotsConfig,
}

/// Find the workspace by walking up from `start`, looking for `.slots/config.toml`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let slots_dir = current.join(SLOTS_DIR);
        if slots_dir.is_dir() && slots_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load the workspace rooted at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let slots_dir = root.join(SLOTS_DIR);
    if !slots_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config_path = slots_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: SlotsConfig = toml::from_str(&text)?;
    Ok(Workspace {
        root: root.to_path_buf(),
        slots_dir,
        config,
    })
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
