use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::event::ShortcutEvent;
use super::key_names::normalize_key;

/// What a handler asks the dispatcher to do after it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Keep offering the event to lower-priority handlers
    #[default]
    Continue,
    /// The event is handled; skip every remaining handler for this key
    Stop,
}

impl From<()> for Propagation {
    fn from(_: ()) -> Self {
        Propagation::Continue
    }
}

pub type Handler = Rc<dyn Fn(&mut ShortcutEvent) -> Propagation>;
pub type Condition = Rc<dyn Fn() -> bool>;

/// Wrap a closure returning `()` or `Propagation` as a handler
pub fn handler<F, R>(f: F) -> Handler
where
    F: Fn(&mut ShortcutEvent) -> R + 'static,
    R: Into<Propagation>,
{
    Rc::new(move |event| f(event).into())
}

/// Options accompanying a registration
#[derive(Clone, Default)]
pub struct ShortcutOptions {
    pub priority: i32,
    pub condition: Option<Condition>,
}

impl ShortcutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn when<C>(mut self, condition: C) -> Self
    where
        C: Fn() -> bool + 'static,
    {
        self.condition = Some(Rc::new(condition));
        self
    }
}

impl fmt::Debug for ShortcutOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutOptions")
            .field("priority", &self.priority)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

/// One binding of a key (or chord) to a consumer's handler
pub struct Registration {
    pub consumer_id: String,
    pub priority: i32,
    handler: Handler,
    condition: Option<Condition>,
}

impl Registration {
    pub fn new(consumer_id: &str, handler: Handler, options: ShortcutOptions) -> Self {
        Self {
            consumer_id: consumer_id.to_string(),
            priority: options.priority,
            handler,
            condition: options.condition,
        }
    }

    /// A registration without a condition is always active
    pub fn is_active(&self) -> bool {
        self.condition.as_ref().map_or(true, |condition| condition())
    }

    pub fn invoke(&self, event: &mut ShortcutEvent) -> Propagation {
        (self.handler)(event)
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("consumer_id", &self.consumer_id)
            .field("priority", &self.priority)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

/// Serializable view of one registration, for debug dumps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationInfo {
    pub key: String,
    pub consumer_id: String,
    pub priority: i32,
    pub conditional: bool,
}

/// Normalized key -> registrations in insertion order.
///
/// Never holds a key whose list is empty, and never holds two registrations
/// for the same (key, consumer) pair.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<String, Vec<Rc<Registration>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the registration for (key, consumer).
    /// A replaced entry moves to the end of the list.
    pub fn insert(&mut self, key: &str, registration: Registration) {
        let key = normalize_key(key);
        let list = self.entries.entry(key).or_default();
        list.retain(|r| r.consumer_id != registration.consumer_id);
        list.push(Rc::new(registration));
    }

    /// Remove the registration for (key, consumer). Returns whether one existed.
    pub fn remove(&mut self, key: &str, consumer_id: &str) -> bool {
        let key = normalize_key(key);
        let Some(list) = self.entries.get_mut(&key) else {
            return false;
        };

        let before = list.len();
        list.retain(|r| r.consumer_id != consumer_id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.entries.remove(&key);
        }
        removed
    }

    /// Remove every registration owned by a consumer. Returns how many went.
    pub fn remove_consumer(&mut self, consumer_id: &str) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, list| {
            let before = list.len();
            list.retain(|r| r.consumer_id != consumer_id);
            removed += before - list.len();
            !list.is_empty()
        });
        removed
    }

    /// Snapshot of the registrations for a key, highest priority first.
    /// Equal priorities keep insertion order.
    pub fn sorted_snapshot(&self, key: &str) -> Vec<Rc<Registration>> {
        let mut snapshot = self
            .entries
            .get(&normalize_key(key))
            .cloned()
            .unwrap_or_default();
        snapshot.sort_by(|a, b| b.priority.cmp(&a.priority));
        snapshot
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    pub fn count(&self, key: &str) -> usize {
        self.entries
            .get(&normalize_key(key))
            .map_or(0, |list| list.len())
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|list| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All registrations, sorted by key then dispatch order
    pub fn describe(&self) -> Vec<RegistrationInfo> {
        self.keys()
            .into_iter()
            .flat_map(|key| {
                self.sorted_snapshot(&key)
                    .into_iter()
                    .map(move |r| RegistrationInfo {
                        key: key.clone(),
                        consumer_id: r.consumer_id.clone(),
                        priority: r.priority,
                        conditional: r.is_conditional(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
