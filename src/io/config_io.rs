use std::fs;
use std::path::Path;

use crate::io::workspace_io::{CONFIG_FILE, WorkspaceError, atomic_write};
use crate::model::clock::ClockStyle;
use crate::model::config::SlotsConfig;
use crate::ops::format::FormatPolicy;

/// Read the workspace config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(
    slots_dir: &Path,
) -> Result<(SlotsConfig, toml_edit::DocumentMut), WorkspaceError> {
    let config_path = slots_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: SlotsConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(slots_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    let config_path = slots_dir.join(CONFIG_FILE);
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| {
        WorkspaceError::WriteError {
            path: config_path,
            source: e,
        }
    })
}

fn ensure_table(doc: &mut toml_edit::DocumentMut, name: &str) {
    if !doc.contains_key(name) {
        doc[name] = toml_edit::Item::Table(toml_edit::Table::new());
    }
}

/// Set `[format] default`
pub fn set_default_format(doc: &mut toml_edit::DocumentMut, policy: FormatPolicy) {
    ensure_table(doc, "format");
    doc["format"]["default"] = toml_edit::value(policy.as_str());
}

/// Set `[display] clock`
pub fn set_clock(doc: &mut toml_edit::DocumentMut, style: ClockStyle) {
    ensure_table(doc, "display");
    doc["display"]["clock"] = toml_edit::value(style.as_str());
}
