use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Normalized name of the key itself, ignoring modifiers.
///
/// Names follow the DOM `KeyboardEvent.key` vocabulary lower-cased
/// (`"arrowup"`, `"escape"`, `"m"`), which is what registrations are keyed by.
/// Modifiers are not part of the name: `Ctrl+M` resolves to `"m"`.
pub fn key_name(code: &KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_lowercase().collect(),
        KeyCode::Enter => "enter".into(),
        KeyCode::Esc => "escape".into(),
        KeyCode::Backspace => "backspace".into(),
        // Shift+Tab still reports "Tab" as its key
        KeyCode::Tab | KeyCode::BackTab => "tab".into(),
        KeyCode::Delete => "delete".into(),
        KeyCode::Insert => "insert".into(),
        KeyCode::F(n) => format!("f{}", n),
        KeyCode::Left => "arrowleft".into(),
        KeyCode::Right => "arrowright".into(),
        KeyCode::Up => "arrowup".into(),
        KeyCode::Down => "arrowdown".into(),
        KeyCode::Home => "home".into(),
        KeyCode::End => "end".into(),
        KeyCode::PageUp => "pageup".into(),
        KeyCode::PageDown => "pagedown".into(),
        KeyCode::CapsLock => "capslock".into(),
        KeyCode::ScrollLock => "scrolllock".into(),
        KeyCode::NumLock => "numlock".into(),
        KeyCode::PrintScreen => "printscreen".into(),
        KeyCode::Pause => "pause".into(),
        KeyCode::Menu => "contextmenu".into(),
        KeyCode::Null => String::new(),
        _ => "unidentified".into(),
    }
}

/// Lower-case a registration key so lookups are case-insensitive
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

/// Format a key event for display
pub fn format_key(key: &KeyEvent) -> String {
    let mut result = format_modifiers(key.modifiers);
    if !result.is_empty() {
        result.push('+');
    }

    match key.code {
        KeyCode::Char(' ') => result.push_str("Space"),
        KeyCode::Char(c) => result.push(c),
        KeyCode::Enter => result.push_str("Enter"),
        KeyCode::Esc => result.push_str("Esc"),
        KeyCode::Backspace => result.push_str("Backspace"),
        KeyCode::Tab => result.push_str("Tab"),
        KeyCode::BackTab => result.push_str("BackTab"),
        KeyCode::Delete => result.push_str("Del"),
        KeyCode::Insert => result.push_str("Ins"),
        KeyCode::F(n) => result.push_str(&format!("F{}", n)),
        KeyCode::Left => result.push_str("←"),
        KeyCode::Right => result.push_str("→"),
        KeyCode::Up => result.push_str("↑"),
        KeyCode::Down => result.push_str("↓"),
        KeyCode::Home => result.push_str("Home"),
        KeyCode::End => result.push_str("End"),
        KeyCode::PageUp => result.push_str("PgUp"),
        KeyCode::PageDown => result.push_str("PgDn"),
        _ => result.push('?'),
    }

    result
}

/// Format modifiers for display
pub fn format_modifiers(mods: KeyModifiers) -> String {
    let mut parts = Vec::new();
    if mods.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl");
    }
    if mods.contains(KeyModifiers::ALT) {
        parts.push("Alt");
    }
    if mods.contains(KeyModifiers::SHIFT) {
        parts.push("Shift");
    }
    if mods.contains(KeyModifiers::SUPER) {
        parts.push("Super");
    }
    parts.join("+")
}
