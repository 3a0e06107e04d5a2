use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::workspace_io::{self, CONFIG_FILE, SLOTS_DIR, WorkspaceError};

use super::workspace_start;

const CONFIG_TEMPLATE: &str = r##"# slots workspace settings. Every key is optional.

[format]
# Layout for `slots preview` and `slots copy` when --format isn't given:
# "bullet", "numbered" or "prose"
default = "bullet"

[display]
clock = "12h"               # "12h" or "24h"
# Length of the end time shown for slots picked without one.
# 0 shows the start time only.
slot_minutes = 30

[notices]
timeout_ms = 2000

[keys]
# Shortcuts for `slots key`
toggle = "alt+s"
exit = "escape"
"##;

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let root = workspace_start()?;
    let slots_dir = root.join(SLOTS_DIR);

    if slots_dir.join(CONFIG_FILE).exists() && !args.force {
        return Err(WorkspaceError::AlreadyInitialized(slots_dir).into());
    }

    // Nested workspaces are allowed, but say so
    if let Some(parent) = root.parent()
        && let Ok(outer) = workspace_io::discover_workspace(parent)
    {
        eprintln!("note: enclosing workspace found at {}/", outer.display());
    }

    fs::create_dir_all(&slots_dir)?;
    workspace_io::atomic_write(&slots_dir.join(CONFIG_FILE), CONFIG_TEMPLATE.as_bytes())?;

    println!("Initialized slots workspace in {}/", slots_dir.display());
    Ok(())
}
