//! Symbolic key vocabulary and the binding-string parser.
//!
//! A binding string is a comma-separated list of combinations, each
//! combination a `+`-joined list of keys, e.g. `"g, end"` or `"alt+caps_lock"`.
//! Strings are parsed once when settings are compiled so malformed bindings
//! are rejected at load time rather than on every frame.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A key the engine can press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Ctrl,
    Shift,
    Alt,
    Tab,
    Space,
    End,
    CapsLock,
    Esc,
    Enter,
    /// Any single literal character
    Char(char),
}

impl Key {
    /// Upper-case display name used for the active key set
    #[must_use]
    pub fn canonical_name(self) -> String {
        match self {
            Self::Ctrl => "CTRL".to_string(),
            Self::Shift => "SHIFT".to_string(),
            Self::Alt => "ALT".to_string(),
            Self::Tab => "TAB".to_string(),
            Self::Space => "SPACE".to_string(),
            Self::End => "END".to_string(),
            Self::CapsLock => "CAPS_LOCK".to_string(),
            Self::Esc => "ESC".to_string(),
            Self::Enter => "ENTER".to_string(),
            Self::Char(c) => c.to_uppercase().collect(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect::<String>();
        let key = match name.as_str() {
            "ctrl" => Self::Ctrl,
            "shift" => Self::Shift,
            "alt" => Self::Alt,
            "tab" => Self::Tab,
            "space" => Self::Space,
            "end" => Self::End,
            "caps_lock" | "capslock" => Self::CapsLock,
            "esc" => Self::Esc,
            "enter" => Self::Enter,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    (None, _) => return Err(Error::KeyBinding("empty key name".to_string())),
                    _ => return Err(Error::KeyBinding(format!("unknown key name: {s}"))),
                }
            }
        };
        Ok(key)
    }
}

/// Keys pressed together, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo(Vec<Key>);

impl KeyCombo {
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.0
    }
}

impl FromStr for KeyCombo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let keys = s
            .split('+')
            .map(str::parse)
            .collect::<Result<Vec<Key>>>()
            .map_err(|e| Error::KeyBinding(format!("in combination '{}': {e}", s.trim())))?;
        Ok(Self(keys))
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|key| key.canonical_name()).collect();
        f.write_str(&names.join("+"))
    }
}

/// A full binding: combinations fired left to right
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeySequence(Vec<KeyCombo>);

impl KeySequence {
    #[must_use]
    pub fn combos(&self) -> &[KeyCombo] {
        &self.0
    }

    /// Every key in the binding, in press order
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.0.iter().flat_map(|combo| combo.keys().iter().copied())
    }

    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.keys().any(|k| k == key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for KeySequence {
    type Err = Error;

    /// The empty (or blank) string parses to an empty, disabled binding
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        s.split(',').map(str::parse).collect::<Result<Vec<KeyCombo>>>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_keys() {
        assert_eq!("ctrl".parse::<Key>().unwrap(), Key::Ctrl);
        assert_eq!(" Caps_Lock ".parse::<Key>().unwrap(), Key::CapsLock);
        assert_eq!("capslock".parse::<Key>().unwrap(), Key::CapsLock);
        assert_eq!("ENTER".parse::<Key>().unwrap(), Key::Enter);
    }

    #[test]
    fn test_literal_keys_are_lowercased() {
        assert_eq!("W".parse::<Key>().unwrap(), Key::Char('w'));
        assert_eq!("'".parse::<Key>().unwrap(), Key::Char('\''));
        assert_eq!(Key::Char('w').canonical_name(), "W");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!("page_up".parse::<Key>(), Err(Error::KeyBinding(_))));
        assert!(matches!("".parse::<Key>(), Err(Error::KeyBinding(_))));
    }

    #[test]
    fn test_sequence_parsing() {
        let seq: KeySequence = "g, end".parse().unwrap();
        assert_eq!(seq.combos().len(), 2);
        assert_eq!(seq.keys().collect::<Vec<_>>(), vec![Key::Char('g'), Key::End]);

        let seq: KeySequence = "alt + caps_lock".parse().unwrap();
        assert_eq!(seq.combos()[0].keys(), &[Key::Alt, Key::CapsLock]);
        assert_eq!(seq.combos()[0].to_string(), "ALT+CAPS_LOCK");
    }

    #[test]
    fn test_empty_sequence_is_disabled() {
        let seq: KeySequence = "  ".parse().unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_malformed_sequences_rejected() {
        for bad in ["ctrl+", "a,,b", "+w", "ctrl+tabby"] {
            assert!(bad.parse::<KeySequence>().is_err(), "expected error for {bad}");
        }
    }
}
