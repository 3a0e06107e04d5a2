use std::fmt;
use std::str::FromStr;

use crate::model::config::KeyConfig;

/// Error type for shortcut strings
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShortcutError {
    #[error("empty shortcut")]
    Empty,
    #[error("shortcut \"{0}\" has no key")]
    MissingKey(String),
    #[error("shortcut \"{0}\" has more than one key")]
    ExtraKey(String),
}

/// A key chord such as `alt+s` or `escape`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shortcut {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
    /// Lowercased key name
    pub key: String,
}

impl Shortcut {
    pub fn key(name: &str) -> Self {
        Shortcut {
            key: normalize_key(name),
            ..Default::default()
        }
    }
}

fn normalize_key(name: &str) -> String {
    let name = name.trim().to_lowercase();
    match name.as_str() {
        "esc" => "escape".to_string(),
        "return" => "enter".to_string(),
        "space" | "spacebar" => " ".to_string(),
        _ => name,
    }
}

impl FromStr for Shortcut {
    type Err = ShortcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ShortcutError::Empty);
        }
        let mut shortcut = Shortcut::default();
        let mut key: Option<String> = None;
        for part in s.split('+').map(str::trim) {
            match part.to_lowercase().as_str() {
                "alt" | "option" => shortcut.alt = true,
                "ctrl" | "control" => shortcut.ctrl = true,
                "shift" => shortcut.shift = true,
                "meta" | "cmd" | "super" => shortcut.meta = true,
                "" => return Err(ShortcutError::MissingKey(s.to_string())),
                _ if key.is_some() => return Err(ShortcutError::ExtraKey(s.to_string())),
                _ => key = Some(normalize_key(part)),
            }
        }
        shortcut.key = key.ok_or_else(|| ShortcutError::MissingKey(s.to_string()))?;
        Ok(shortcut)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, name) in [
            (self.ctrl, "ctrl+"),
            (self.alt, "alt+"),
            (self.shift, "shift+"),
            (self.meta, "meta+"),
        ] {
            if on {
                f.write_str(name)?;
            }
        }
        match self.key.as_str() {
            " " => f.write_str("space"),
            k => f.write_str(k),
        }
    }
}

/// Shortcuts the session reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Flips selection mode on and off
    pub toggle: Shortcut,
    /// Leaves selection mode (only while it is on)
    pub exit: Shortcut,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            toggle: Shortcut {
                alt: true,
                ..Shortcut::key("s")
            },
            exit: Shortcut::key("escape"),
        }
    }
}

impl KeyBindings {
    pub fn from_config(keys: &KeyConfig) -> Result<Self, ShortcutError> {
        Ok(KeyBindings {
            toggle: keys.toggle.parse()?,
            exit: keys.exit.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modifiers_and_key() {
        let s: Shortcut = "Alt+S".parse().unwrap();
        assert!(s.alt && !s.ctrl && !s.shift && !s.meta);
        assert_eq!(s.key, "s");
        let s: Shortcut = "ctrl + shift + K".parse().unwrap();
        assert!(s.ctrl && s.shift);
        assert_eq!(s.key, "k");
    }

    #[test]
    fn key_aliases() {
        assert_eq!("esc".parse::<Shortcut>().unwrap(), Shortcut::key("escape"));
        assert_eq!("Escape".parse::<Shortcut>().unwrap(), Shortcut::key("escape"));
    }

    #[test]
    fn malformed_shortcuts() {
        assert_eq!("".parse::<Shortcut>(), Err(ShortcutError::Empty));
        assert_eq!(
            "alt+".parse::<Shortcut>(),
            Err(ShortcutError::MissingKey("alt+".into()))
        );
        assert_eq!(
            "alt".parse::<Shortcut>(),
            Err(ShortcutError::MissingKey("alt".into()))
        );
        assert_eq!(
            "a+b".parse::<Shortcut>(),
            Err(ShortcutError::ExtraKey("a+b".into()))
        );
    }

    #[test]
    fn display_is_canonical() {
        let s: Shortcut = "shift+ctrl+x".parse().unwrap();
        assert_eq!(s.to_string(), "ctrl+shift+x");
        assert_eq!(KeyBindings::default().toggle.to_string(), "alt+s");
    }

    #[test]
    fn bindings_from_config() {
        let keys = KeyConfig::default();
        assert_eq!(KeyBindings::from_config(&keys).unwrap(), KeyBindings::default());
        let custom = KeyConfig {
            toggle: "ctrl+shift+s".into(),
            exit: "q".into(),
        };
        let b = KeyBindings::from_config(&custom).unwrap();
        assert_eq!(b.exit, Shortcut::key("q"));
        assert!(b.toggle.ctrl && b.toggle.shift && !b.toggle.alt);
    }
}
