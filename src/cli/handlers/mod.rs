mod init;
pub use init::cmd_init;

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, warn};

/// Global override for the workspace directory (set by -C flag)
static WORKSPACE_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::StateLock;
use crate::io::state::{self, SessionState};
use crate::io::watcher::{SnapshotEvent, SnapshotWatcher};
use crate::io::workspace_io::{self, Workspace, WorkspaceError};
use crate::model::clock::ClockStyle;
use crate::model::config::SlotsConfig;
use crate::ops::format::FormatPolicy;
use crate::ops::keys::Shortcut;
use crate::ops::selection::SelectionMode;
use crate::ops::session::{Command, Response, Session, SessionError, SessionOptions, ToggleOutcome};
use crate::page::{NodeId, Page, PageQuery};

/// Longest the watch loop blocks before re-checking its timers
const WATCH_POLL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    // Store -C override for workspace_start()
    if let Some(ref dir) = cli.workspace_dir {
        let abs = fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        WORKSPACE_DIR_OVERRIDE
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(abs);
    }

    match cli.command {
        Commands::Init(args) => cmd_init(args),

        // Selection
        Commands::Mode(args) => cmd_mode(args, json),
        Commands::Key(args) => cmd_key(args, json),
        Commands::Pick(args) => cmd_pick(args, json),
        Commands::Remove(args) => cmd_remove(args, json),
        Commands::Clear => cmd_clear(json),

        // Read commands
        Commands::List => cmd_list(json),
        Commands::Status => cmd_status(json),
        Commands::Preview(args) => cmd_preview(args, json),
        Commands::Copy(args) => cmd_copy(args, json),

        // Page tracking
        Commands::Watch(args) => cmd_watch(args),

        Commands::Config(cmd) => cmd_config(cmd),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Directory commands run against: the -C override, else the current directory
fn workspace_start() -> Result<PathBuf, std::io::Error> {
    let dir = WORKSPACE_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    match dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir(),
    }
}

fn load_workspace_cwd() -> Result<Workspace, WorkspaceError> {
    let start = workspace_start()?;
    let root = workspace_io::discover_workspace(&start)?;
    workspace_io::load_workspace(&root)
}

/// Saved session for read-only commands. Takes no lock.
fn load_session(ws: &Workspace) -> Result<Session, Box<dyn std::error::Error>> {
    let options = SessionOptions::from_config(&ws.config)?;
    let saved = state::read_session_state(&ws.slots_dir).unwrap_or_default();
    Ok(saved.into_session(options))
}

/// Run `f` against the saved session under the state lock, then save it.
///
/// Notices raised while `f` runs are printed to stderr whether or not it
/// succeeds; state is only written back on success.
fn with_session<T>(
    today: Option<NaiveDate>,
    f: impl FnOnce(&mut Session) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let _lock = StateLock::acquire(&ws.slots_dir)?;

    let mut options = SessionOptions::from_config(&ws.config)?;
    options.today = today;
    let saved = state::read_session_state(&ws.slots_dir).unwrap_or_default();
    let mut session = saved.into_session(options);

    let result = f(&mut session);
    for notice in session.active_notices(Instant::now()) {
        eprintln!("{}", notice);
    }
    let value = result?;

    state::write_session_state(&ws.slots_dir, &SessionState::capture(&session))?;
    Ok(value)
}

/// Layout named on the command line (strict), else the configured default
fn render_policy(flag: Option<&str>, config: &SlotsConfig) -> Result<FormatPolicy, String> {
    match flag {
        Some(name) => FormatPolicy::parse_policy(name).ok_or_else(|| unknown_policy(name)),
        None => Ok(FormatPolicy::from_name(&config.format.default)),
    }
}

fn unknown_policy(name: &str) -> String {
    let names: Vec<&str> = FormatPolicy::ALL.iter().map(|p| p.as_str()).collect();
    format!("unknown format '{}' (expected {})", name, names.join(", "))
}

/// Element a pick targets. `Ok(None)` when the point lands on nothing.
fn locate_anchor(page: &Page, args: &PickArgs) -> Result<Option<NodeId>, String> {
    if let Some(ref id) = args.anchor {
        return page.find_by_id(id).map(Some).ok_or_else(|| {
            format!(
                "no element with id '{}' in {}",
                id,
                args.snapshot.display()
            )
        });
    }
    Ok(args.at.and_then(|pt| page.hit_test(pt.x, pt.y)))
}

fn print_status(session: &Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&status_to_json(session.store()))?);
    } else {
        println!("{}", format_status(session.store()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Selection commands
// ---------------------------------------------------------------------------

fn cmd_mode(args: ModeArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    with_session(None, |session| {
        let command = match (args.state, session.store().mode()) {
            (ModeSwitch::On, _) | (ModeSwitch::Toggle, SelectionMode::Idle) => {
                Command::EnterSelectionMode
            }
            (ModeSwitch::Off, _) | (ModeSwitch::Toggle, SelectionMode::Active) => {
                Command::ExitSelectionMode
            }
        };
        match session.handle(command, None)? {
            Response::Mode(_) => print_status(session, json),
            other => Err(format!("unexpected response: {:?}", other).into()),
        }
    })
}

fn cmd_key(args: KeyArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let shortcut: Shortcut = args.shortcut.parse()?;
    with_session(None, |session| {
        if session.handle_key(&shortcut).is_none() {
            debug!(%shortcut, "shortcut had no effect");
            if !json {
                println!("{}: no effect", shortcut);
                return Ok(());
            }
        }
        print_status(session, json)
    })
}

fn cmd_pick(args: PickArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = Page::load(&args.snapshot);
    if let Err(ref e) = loaded {
        warn!(error = %e, "page snapshot unavailable");
    }
    let page = loaded.as_ref().ok();
    let anchor = match page {
        Some(p) => locate_anchor(p, &args)?,
        None => None,
    };

    let (result, count) = with_session(args.today, |session| {
        let result = match (page, anchor) {
            (Some(_), None) if session.store().is_active() => Ok(ToggleOutcome::Missed),
            (Some(_), None) => Ok(ToggleOutcome::Ignored),
            (page, anchor) => {
                // without a page the anchor is never looked at
                let anchor = anchor.unwrap_or(NodeId(0));
                let page = page.map(|p| p as &dyn PageQuery);
                session
                    .handle(Command::ToggleAtPoint(anchor), page)
                    .map(|response| match response {
                        Response::Toggle(outcome) => outcome,
                        _ => ToggleOutcome::Missed,
                    })
            }
        };
        Ok((result, session.store().len()))
    })?;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(SessionError::PageUnavailable) => {
            return Err(match loaded {
                Err(e) => e.into(),
                Ok(_) => SessionError::PageUnavailable.into(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&pick_to_json(&outcome, count))?);
    } else {
        println!("{}", format_pick(&outcome));
    }
    Ok(())
}

fn cmd_remove(args: RemoveArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let removed = with_session(None, |session| {
        match session.handle(Command::RemoveSlot(args.id.clone()), None)? {
            Response::Removed(slot) => Ok(slot),
            _ => Ok(None),
        }
    })?;
    let slot = removed.ok_or_else(|| format!("slot not found: {}", args.id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&slot_to_json(&slot))?);
    } else {
        println!("removed {}", slot.id());
    }
    Ok(())
}

fn cmd_clear(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    with_session(None, |session| {
        session.handle(Command::ClearAll, None)?;
        print_status(session, json)
    })
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let mut session = load_session(&ws)?;
    let Response::Slots(slots) = session.handle(Command::GetSlots, None)? else {
        return Err("unexpected response to slot listing".into());
    };

    if json {
        let out: Vec<SlotJson> = slots.iter().map(slot_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if slots.is_empty() {
        println!("no slots selected");
    } else {
        for line in format_slot_table(&slots) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_status(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let session = load_session(&ws)?;
    print_status(&session, json)
}

fn cmd_preview(args: RenderArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let policy = render_policy(args.format.as_deref(), &ws.config)?;
    let mut session = load_session(&ws)?;
    let text = match session.handle(Command::RenderPreview(policy), None)? {
        Response::Preview(text) => text,
        _ => None,
    };

    if json {
        let out = RenderJson {
            format: policy.as_str(),
            text,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match text {
            Some(text) => println!("{}", text),
            None => println!("no slots selected"),
        }
    }
    Ok(())
}

fn cmd_copy(args: CopyArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let policy = render_policy(args.render.format.as_deref(), &ws.config)?;
    let mut session = load_session(&ws)?;
    let Response::Copy(text) = session.handle(Command::RenderForCopy(policy), None)? else {
        return Err("unexpected response to copy".into());
    };

    match args.out {
        Some(path) => {
            fs::write(&path, &text).map_err(|e| WorkspaceError::WriteError {
                path: path.clone(),
                source: e,
            })?;
            eprintln!(
                "copied {} slot(s) to {}",
                session.store().len(),
                path.display()
            );
        }
        None if json => {
            let out = RenderJson {
                format: policy.as_str(),
                text: Some(text),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        None => println!("{}", text),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Page tracking
// ---------------------------------------------------------------------------

fn cmd_watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let mut session = load_session(&ws)?;
    let watcher = SnapshotWatcher::start(&args.snapshot)?;
    let stop_at = args
        .duration_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));

    eprintln!("watching {}", args.snapshot.display());
    loop {
        let now = Instant::now();
        if stop_at.is_some_and(|t| now >= t) {
            break;
        }
        let wait = session
            .relayout_remaining(now)
            .map_or(WATCH_POLL, |left| left.min(WATCH_POLL));
        match watcher.wait(wait) {
            Some(SnapshotEvent::Changed(path)) => {
                debug!(path = %path.display(), "page snapshot changed");
                session.layout_changed(Instant::now());
            }
            Some(SnapshotEvent::Removed(path)) => {
                warn!(path = %path.display(), "page snapshot removed");
            }
            None => {}
        }

        if session
            .relayout_remaining(Instant::now())
            .is_some_and(|left| left.is_zero())
        {
            let cleared = clear_stale_markers(&ws, &mut session)?;
            if cleared > 0 {
                println!("layout changed: cleared {} marker(s)", cleared);
            }
        }
    }
    Ok(())
}

/// Settle a relayout against the saved selection: other commands may have
/// picked or removed slots since the watch started. Returns the number of
/// markers dropped.
fn clear_stale_markers(
    ws: &Workspace,
    session: &mut Session,
) -> Result<usize, Box<dyn std::error::Error>> {
    let _lock = StateLock::acquire(&ws.slots_dir)?;
    state::read_session_state(&ws.slots_dir)
        .unwrap_or_default()
        .restore_into(session);
    let stale = session.highlighter().len();
    if !session.tick(Instant::now()) || stale == 0 {
        return Ok(0);
    }
    state::write_session_state(&ws.slots_dir, &SessionState::capture(session))?;
    Ok(stale)
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(cmd: ConfigCmd) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let _lock = StateLock::acquire(&ws.slots_dir)?;
    let (_, mut doc) = config_io::read_config(&ws.slots_dir)?;

    match cmd.action {
        ConfigAction::Format { policy } => {
            let policy = FormatPolicy::parse_policy(&policy).ok_or_else(|| unknown_policy(&policy))?;
            config_io::set_default_format(&mut doc, policy);
            println!("format.default = {}", policy.as_str());
        }
        ConfigAction::Clock { style } => {
            let style = ClockStyle::parse_style(&style)
                .ok_or_else(|| format!("unknown clock style '{}' (expected 12h or 24h)", style))?;
            config_io::set_clock(&mut doc, style);
            println!("display.clock = {}", style.as_str());
        }
    }

    config_io::write_config(&ws.slots_dir, &doc)?;
    Ok(())
}
