use serde::{Deserialize, Serialize};

use super::clock::ClockStyle;
use super::slot::{DEFAULT_SLOT_MINUTES, DisplayOptions};

/// Configuration from `.slots/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotsConfig {
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub notices: NoticeConfig,
    #[serde(default)]
    pub keys: KeyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Layout used when a render command doesn't name one.
    /// Unknown names fall back to the bulleted layout.
    #[serde(default = "default_format")]
    pub default: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            default: default_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub clock: ClockStyle,
    /// Default: see src/cli/handlers/init.rs template
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            clock: ClockStyle::default(),
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

impl DisplayConfig {
    pub fn options(&self) -> DisplayOptions {
        DisplayOptions {
            clock: self.clock,
            slot_minutes: self.slot_minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        NoticeConfig {
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyConfig {
    #[serde(default = "default_toggle_key")]
    pub toggle: String,
    #[serde(default = "default_exit_key")]
    pub exit: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        KeyConfig {
            toggle: default_toggle_key(),
            exit: default_exit_key(),
        }
    }
}

fn default_format() -> String {
    "bullet".to_string()
}

fn default_slot_minutes() -> u32 {
    DEFAULT_SLOT_MINUTES
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_toggle_key() -> String {
    "alt+s".to_string()
}

fn default_exit_key() -> String {
    "escape".to_string()
}
