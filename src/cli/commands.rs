use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "slots", about = concat!("slots v", env!("CARGO_PKG_VERSION"), " - pick times off a calendar, paste them anywhere"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,

    /// Log recognition details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a slots workspace in the current directory
    Init(InitArgs),
    /// Turn selection mode on or off
    Mode(ModeArgs),
    /// Send a keyboard shortcut (e.g. alt+s, escape)
    Key(KeyArgs),
    /// Pick (or unpick) the slot at a point on a page snapshot
    Pick(PickArgs),
    /// Remove a selected slot by id
    Remove(RemoveArgs),
    /// Remove every selected slot
    Clear,
    /// List selected slots
    List,
    /// Show selection mode and slot count
    Status,
    /// Preview the selection as text
    Preview(RenderArgs),
    /// Render the selection for pasting
    Copy(CopyArgs),
    /// Watch a page snapshot and drop stale highlight markers when it changes
    Watch(WatchArgs),
    /// Change workspace settings
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Setup args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Reinitialize even if .slots/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Selection args
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeSwitch {
    On,
    Off,
    Toggle,
}

#[derive(Args)]
pub struct ModeArgs {
    /// on, off or toggle
    #[arg(value_enum)]
    pub state: ModeSwitch,
}

#[derive(Args)]
pub struct KeyArgs {
    /// Shortcut such as alt+s
    pub shortcut: String,
}

/// Viewport point `X,Y`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl FromStr for Point {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y, got \"{}\"", s))?;
        let x = x.trim().parse().map_err(|_| format!("bad x coordinate in \"{}\"", s))?;
        let y = y.trim().parse().map_err(|_| format!("bad y coordinate in \"{}\"", s))?;
        Ok(Point { x, y })
    }
}

#[derive(Args)]
pub struct PickArgs {
    /// Page snapshot (JSON)
    pub snapshot: PathBuf,
    /// Point on the page to pick at
    #[arg(long, value_name = "X,Y", conflicts_with = "anchor", required_unless_present = "anchor")]
    pub at: Option<Point>,
    /// Element id to pick at
    #[arg(long, value_name = "ID")]
    pub anchor: Option<String>,
    /// Date to treat as today when inferring months and years (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Slot id (see `slots list`)
    pub id: String,
}

// ---------------------------------------------------------------------------
// Render args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RenderArgs {
    /// Layout: bullet, numbered or prose (default: from config)
    #[arg(long, short)]
    pub format: Option<String>,
}

#[derive(Args)]
pub struct CopyArgs {
    #[command(flatten)]
    pub render: RenderArgs,
    /// Write to a file instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Page snapshot (JSON) to watch
    pub snapshot: PathBuf,
    /// Stop after this many milliseconds (default: run until interrupted)
    #[arg(long, value_name = "MS")]
    pub duration_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Config args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set the default layout (bullet, numbered, prose)
    Format { policy: String },
    /// Set the clock style (12h, 24h)
    Clock { style: String },
}
