//! The shortcut dispatcher: registry, chord state machine and dispatch.
//!
//! Every key press goes through [`ShortcutDispatcher::handle_key_event`]
//! before any widget sees it. A press of the chord prefix while idle is
//! swallowed and arms the chord; the next press is then looked up under
//! `"<prefix>+<key>"` instead of the plain key name. Registrations for the
//! lookup key run in descending priority until one returns
//! [`Propagation::Stop`] or prevents the default action.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::KeyCode;
use tracing::{debug, info, trace};

use super::chord::{ChordState, Clock, SystemClock, DEFAULT_CHORD_TIMEOUT};
use super::event::ShortcutEvent;
use super::key_names::{format_key, format_modifiers, normalize_key};
use super::registry::{
    Handler, Propagation, Registration, RegistrationInfo, Registry, ShortcutOptions,
};
use crate::config::config::ShortcutConfig;
use crate::config::key_bindings::KeyBinding;

/// Settings the dispatcher is created with
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub prefix: KeyBinding,
    pub chord_timeout: Duration,
    pub max_history: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            prefix: KeyBinding::with_ctrl(KeyCode::Char('x')),
            chord_timeout: DEFAULT_CHORD_TIMEOUT,
            max_history: 50,
        }
    }
}

impl DispatcherConfig {
    pub fn from_config(config: &ShortcutConfig) -> Self {
        Self {
            prefix: config.prefix_binding(),
            chord_timeout: Duration::from_millis(config.chord_timeout_ms),
            max_history: config.key_history,
        }
    }
}

/// What happened to one key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The chord prefix was pressed while idle; the event was swallowed
    PrefixArmed,
    /// Registrations existed for the lookup key; `invoked` of them ran
    Handled { key: String, invoked: usize },
    /// Nothing was registered under the lookup key
    Unmatched { key: String },
    /// Not a key press (release events)
    Ignored,
    /// The dispatcher was shut down
    Detached,
}

impl Dispatch {
    pub fn lookup_key(&self) -> Option<&str> {
        match self {
            Dispatch::Handled { key, .. } | Dispatch::Unmatched { key } => Some(key),
            _ => None,
        }
    }

    pub fn invoked(&self) -> usize {
        match self {
            Dispatch::Handled { invoked, .. } => *invoked,
            _ => 0,
        }
    }
}

/// Registrations resolved for one event, captured before any handler runs
#[derive(Debug)]
pub struct DispatchPlan {
    lookup_key: String,
    registrations: Vec<Rc<Registration>>,
    chorded: bool,
}

impl DispatchPlan {
    pub fn lookup_key(&self) -> &str {
        &self.lookup_key
    }

    /// Invoke the planned handlers in order. Returns how many ran.
    pub fn run(&self, event: &mut ShortcutEvent) -> usize {
        let mut invoked = 0;
        for registration in &self.registrations {
            if !registration.is_active() {
                trace!(
                    "ShortcutDispatcher: skipping '{}' for {} (condition false)",
                    self.lookup_key,
                    registration.consumer_id
                );
                continue;
            }

            invoked += 1;
            let result = registration.invoke(event);

            if result == Propagation::Stop || event.is_default_prevented() {
                debug!(
                    "ShortcutDispatcher: '{}' consumed by {} (priority {})",
                    self.lookup_key, registration.consumer_id, registration.priority
                );
                break;
            }
        }
        invoked
    }

    fn into_outcome(self, invoked: usize) -> Dispatch {
        if self.registrations.is_empty() {
            Dispatch::Unmatched {
                key: self.lookup_key,
            }
        } else {
            Dispatch::Handled {
                key: self.lookup_key,
                invoked,
            }
        }
    }
}

/// First phase of handling an event: either finished already or a plan to run
#[derive(Debug)]
pub enum DispatchStart {
    Done(Dispatch),
    Run(DispatchPlan),
}

/// Registry plus chord state machine for one input stream
pub struct ShortcutDispatcher {
    registry: Registry,
    chord: ChordState,
    prefix: KeyBinding,
    clock: Rc<dyn Clock>,
    listening: bool,
    key_history: VecDeque<String>,
    max_history: usize,
    last_key: Option<String>,
}

impl ShortcutDispatcher {
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    pub fn with_clock(config: DispatcherConfig, clock: Rc<dyn Clock>) -> Self {
        debug!(
            "ShortcutDispatcher: listening (prefix {}, timeout {}ms)",
            config.prefix.label(),
            config.chord_timeout.as_millis()
        );
        Self {
            registry: Registry::new(),
            chord: ChordState::new(config.chord_timeout),
            prefix: config.prefix,
            clock,
            listening: true,
            key_history: VecDeque::with_capacity(config.max_history),
            max_history: config.max_history,
            last_key: None,
        }
    }

    /// Add or replace the registration for (key, consumer)
    pub fn register(
        &mut self,
        key: &str,
        consumer_id: &str,
        handler: Handler,
        options: ShortcutOptions,
    ) {
        trace!(
            "ShortcutDispatcher: register '{}' for {} ({:?})",
            normalize_key(key),
            consumer_id,
            options
        );
        self.registry
            .insert(key, Registration::new(consumer_id, handler, options));
    }

    pub fn unregister(&mut self, key: &str, consumer_id: &str) {
        if self.registry.remove(key, consumer_id) {
            trace!(
                "ShortcutDispatcher: unregistered '{}' for {}",
                normalize_key(key),
                consumer_id
            );
        }
    }

    pub fn unregister_all(&mut self, consumer_id: &str) {
        let removed = self.registry.remove_consumer(consumer_id);
        if removed > 0 {
            debug!(
                "ShortcutDispatcher: removed {} registrations for {}",
                removed, consumer_id
            );
        }
    }

    /// Detach from input, cancel the chord timer and forget every registration
    pub fn shutdown(&mut self) {
        info!(
            "ShortcutDispatcher: shutting down ({} registrations dropped)",
            self.registry.len()
        );
        self.listening = false;
        self.chord.disarm();
        self.registry.clear();
        self.last_key = None;
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_prefix_armed(&self) -> bool {
        self.chord.is_armed()
    }

    pub fn prefix(&self) -> &KeyBinding {
        &self.prefix
    }

    pub fn chord_timeout(&self) -> Duration {
        self.chord.window()
    }

    /// When the pending chord timer will fire, if one is pending
    pub fn next_deadline(&self) -> Option<Instant> {
        self.chord.deadline()
    }

    /// Fire the chord timer if it is due. Returns true if the prefix disarmed.
    pub fn fire_due_timers(&mut self) -> bool {
        let now = self.clock.now();
        let expired = self.chord.expire_if_due(now);
        if expired {
            debug!(
                "ShortcutDispatcher: chord prefix {} timed out",
                self.prefix.label()
            );
        }
        expired
    }

    pub fn registered_keys(&self) -> Vec<String> {
        self.registry.keys()
    }

    pub fn registration_count(&self, key: &str) -> usize {
        self.registry.count(key)
    }

    pub fn registrations(&self) -> Vec<RegistrationInfo> {
        self.registry.describe()
    }

    /// Resolve an event against the chord state and registry.
    ///
    /// Handlers are not run here, so a caller holding the dispatcher behind a
    /// `RefCell` can release its borrow before user code executes.
    pub fn begin_dispatch(&mut self, event: &mut ShortcutEvent) -> DispatchStart {
        if !self.listening {
            return DispatchStart::Done(Dispatch::Detached);
        }
        if !event.is_key_down() {
            return DispatchStart::Done(Dispatch::Ignored);
        }

        self.fire_due_timers();
        self.log_key_press(event);

        if !self.chord.is_armed() && self.prefix.matches(event.key_event()) {
            event.prevent_default();
            let now = self.clock.now();
            self.chord.arm(now);
            debug!(
                "ShortcutDispatcher: chord prefix {} armed",
                self.prefix.label()
            );
            return DispatchStart::Done(Dispatch::PrefixArmed);
        }

        let chorded = self.chord.is_armed();
        let key = event.key_name();
        let lookup_key = if chorded {
            format!("{}+{}", self.prefix.label(), key)
        } else {
            key
        };

        let registrations = self.registry.sorted_snapshot(&lookup_key);
        trace!(
            "ShortcutDispatcher: '{}' -> {} registrations",
            lookup_key,
            registrations.len()
        );

        DispatchStart::Run(DispatchPlan {
            lookup_key,
            registrations,
            chorded,
        })
    }

    /// Settle the chord state once the planned handlers have run.
    /// A chord with at least one registration is consumed even if every
    /// condition was false; an unknown chord leaves the prefix armed.
    pub fn finish_dispatch(&mut self, plan: &DispatchPlan) {
        if plan.chorded && !plan.registrations.is_empty() {
            debug!(
                "ShortcutDispatcher: chord '{}' consumed, prefix disarmed",
                plan.lookup_key
            );
            self.chord.disarm();
        }
    }

    /// Dispatch one key event to completion
    pub fn handle_key_event(&mut self, event: &mut ShortcutEvent) -> Dispatch {
        match self.begin_dispatch(event) {
            DispatchStart::Done(outcome) => outcome,
            DispatchStart::Run(plan) => {
                let invoked = plan.run(event);
                self.finish_dispatch(&plan);
                plan.into_outcome(invoked)
            }
        }
    }

    /// Log a key press to history
    fn log_key_press(&mut self, event: &ShortcutEvent) {
        self.last_key = Some(format_key(event.key_event()));
        if self.max_history == 0 {
            return;
        }
        if self.key_history.len() >= self.max_history {
            self.key_history.pop_front();
        }

        let timestamp = Local::now().format("%H:%M:%S.%3f");
        let key = event.key_event();
        let modifiers = format_modifiers(key.modifiers);
        let armed = if self.chord.is_armed() {
            format!(" [{}]", self.prefix.label())
        } else {
            String::new()
        };

        let entry = if modifiers.is_empty() {
            format!("[{}] {}{}", timestamp, format_key(key), armed)
        } else {
            format!("[{}] {} ({}){}", timestamp, format_key(key), modifiers, armed)
        };
        self.key_history.push_back(entry);
    }

    pub fn get_history(&self) -> Vec<String> {
        self.key_history.iter().cloned().collect()
    }

    /// Display label of the most recent key, without the history timestamp
    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    /// Pretty print for debug view
    pub fn format_debug_info(&self) -> String {
        let mut output = String::new();

        output.push_str("========== CHORD STATE ==========\n");
        output.push_str(&format!("Prefix: {}\n", self.prefix.label()));
        if !self.listening {
            output.push_str("Detached (shut down)\n");
        } else if self.chord.is_armed() {
            output.push_str("Armed, waiting for follow-up key\n");
            if let Some(remaining) = self.chord.remaining(self.clock.now()) {
                output.push_str(&format!("Timeout in: {}ms\n", remaining.as_millis()));
            }
        } else {
            output.push_str("Idle\n");
        }

        output.push_str("\n========== REGISTRATIONS ==========\n");
        let mut current_key: Option<&str> = None;
        let registrations = self.registry.describe();
        for info in &registrations {
            if current_key != Some(info.key.as_str()) {
                output.push_str(&format!("{}:\n", info.key));
                current_key = Some(info.key.as_str());
            }
            output.push_str(&format!(
                "  {} (priority {}{})\n",
                info.consumer_id,
                info.priority,
                if info.conditional { ", conditional" } else { "" }
            ));
        }
        if registrations.is_empty() {
            output.push_str("(none)\n");
        }

        output.push_str("\n========== KEY PRESS HISTORY ==========\n");
        output.push_str(&format!(
            "(Most recent at bottom, last {} keys)\n",
            self.max_history
        ));
        for entry in &self.key_history {
            output.push_str(entry);
            output.push('\n');
        }

        output
    }
}

impl Default for ShortcutDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// A dispatcher shared between the input loop and its consumers.
///
/// Handlers run with no borrow held, so they may register, unregister or
/// shut down through this handle while an event is being dispatched; changes
/// apply from the next event on.
#[derive(Clone)]
pub struct SharedDispatcher {
    inner: Rc<RefCell<ShortcutDispatcher>>,
}

impl SharedDispatcher {
    pub fn new(dispatcher: ShortcutDispatcher) -> Self {
        Self {
            inner: Rc::new(RefCell::new(dispatcher)),
        }
    }

    pub fn handle_key_event(&self, event: &mut ShortcutEvent) -> Dispatch {
        let start = self.inner.borrow_mut().begin_dispatch(event);
        match start {
            DispatchStart::Done(outcome) => outcome,
            DispatchStart::Run(plan) => {
                let invoked = plan.run(event);
                self.inner.borrow_mut().finish_dispatch(&plan);
                plan.into_outcome(invoked)
            }
        }
    }

    pub fn fire_due_timers(&self) -> bool {
        self.inner.borrow_mut().fire_due_timers()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.borrow().next_deadline()
    }

    pub fn is_prefix_armed(&self) -> bool {
        self.inner.borrow().is_prefix_armed()
    }

    pub fn is_listening(&self) -> bool {
        self.inner.borrow().is_listening()
    }

    /// Run a closure against the dispatcher. Must not be called from a handler
    /// that is itself inside `with`.
    pub fn with<T>(&self, f: impl FnOnce(&mut ShortcutDispatcher) -> T) -> T {
        f(&mut self.inner.borrow_mut())
    }
}

impl Default for SharedDispatcher {
    fn default() -> Self {
        Self::new(ShortcutDispatcher::new())
    }
}
