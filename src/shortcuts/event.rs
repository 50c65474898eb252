use crossterm::event::{KeyEvent, KeyEventKind, KeyModifiers};

use super::key_names::key_name;

/// A key press travelling through the shortcut dispatcher.
///
/// Wraps the raw `crossterm` event with the two flags handlers use to signal
/// consumption: `prevent_default` (also ends dispatch to lower priorities) and
/// `stop_propagation` (tells the host not to forward the key to widgets).
#[derive(Debug, Clone)]
pub struct ShortcutEvent {
    key: KeyEvent,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl ShortcutEvent {
    pub fn new(key: KeyEvent) -> Self {
        Self {
            key,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn key_event(&self) -> &KeyEvent {
        &self.key
    }

    pub fn modifiers(&self) -> KeyModifiers {
        self.key.modifiers
    }

    /// Lower-cased key name, modifiers excluded
    pub fn key_name(&self) -> String {
        key_name(&self.key.code)
    }

    /// Key presses and auto-repeats count as keydown; releases do not
    pub fn is_key_down(&self) -> bool {
        matches!(self.key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Whether the host should keep this key away from other input handlers
    pub fn is_consumed(&self) -> bool {
        self.default_prevented || self.propagation_stopped
    }
}

impl From<KeyEvent> for ShortcutEvent {
    fn from(key: KeyEvent) -> Self {
        Self::new(key)
    }
}
