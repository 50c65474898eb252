use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;

use crate::shortcuts::key_names::key_name;

/// Represents a key binding: one key code plus the modifiers that must be held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::empty(),
        }
    }

    pub fn with_ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn with_alt(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::ALT,
        }
    }

    /// Parse notation like "ctrl+x", "alt+g" or "f2"
    pub fn parse(notation: &str) -> Result<Self> {
        let notation = notation.trim().to_lowercase();
        if notation.is_empty() {
            bail!("empty key binding");
        }

        // A trailing '+' means the key itself is '+', as in "ctrl++"
        let (mods_part, key_part) = match notation.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => match notation.rsplit_once('+') {
                Some((mods, key)) => (mods, key),
                None => ("", notation.as_str()),
            },
        };

        let mut modifiers = KeyModifiers::empty();
        for part in mods_part.split('+').filter(|p| !p.is_empty()) {
            modifiers |= match part {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "option" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                "super" | "cmd" | "meta" => KeyModifiers::SUPER,
                other => bail!("unknown modifier '{}' in '{}'", other, notation),
            };
        }

        let code = parse_key_code(key_part)
            .ok_or_else(|| anyhow::anyhow!("unknown key '{}' in '{}'", key_part, notation))?;

        Ok(Self { code, modifiers })
    }

    /// Whether an incoming event is this binding. The modifiers must all be
    /// held and characters compare case-insensitively, so Ctrl+Shift+X still
    /// matches "ctrl+x".
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if !event.modifiers.contains(self.modifiers) {
            return false;
        }
        match (self.code, event.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        }
    }

    /// Lower-case notation, used as the prefix of chord registration keys
    pub fn label(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("ctrl".into());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("alt".into());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("shift".into());
        }
        if self.modifiers.contains(KeyModifiers::SUPER) {
            parts.push("super".into());
        }
        parts.push(key_name(&self.code));
        parts.join("+")
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn parse_key_code(part: &str) -> Option<KeyCode> {
    let code = match part {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "up" | "arrowup" => KeyCode::Up,
        "down" | "arrowdown" => KeyCode::Down,
        "left" | "arrowleft" => KeyCode::Left,
        "right" | "arrowright" => KeyCode::Right,
        _ => {
            if let Some(n) = part.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                return (1..=24).contains(&n).then_some(KeyCode::F(n));
            }
            let mut chars = part.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(code)
}
