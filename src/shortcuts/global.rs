//! The process-wide shortcut dispatcher.
//!
//! Terminal input is one stream, so there is one dispatcher per UI thread.
//! It is created on first registration (or by [`init`]) and lives until
//! [`shutdown`]; the next registration after a shutdown starts a fresh one.

use std::cell::RefCell;
use std::time::Instant;

use tracing::debug;

use super::dispatcher::{Dispatch, DispatcherConfig, SharedDispatcher, ShortcutDispatcher};
use super::event::ShortcutEvent;
use super::registry::{Handler, RegistrationInfo, ShortcutOptions};
use super::router::ShortcutRouter;

thread_local! {
    static DISPATCHER: RefCell<Option<SharedDispatcher>> = const { RefCell::new(None) };
}

/// Install a dispatcher with explicit settings. Returns false, leaving the
/// existing one untouched, if a dispatcher is already running.
pub fn init(config: DispatcherConfig) -> bool {
    DISPATCHER.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(SharedDispatcher::new(ShortcutDispatcher::with_config(config)));
        true
    })
}

/// Install a specific dispatcher, replacing any running one
pub fn install(dispatcher: SharedDispatcher) {
    DISPATCHER.with(|slot| {
        if let Some(previous) = slot.borrow_mut().replace(dispatcher) {
            previous.with(|d| d.shutdown());
        }
    });
}

/// The running dispatcher, created with default settings if there is none
pub fn dispatcher() -> SharedDispatcher {
    DISPATCHER.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(|| {
                debug!("global shortcuts: creating dispatcher on first use");
                SharedDispatcher::default()
            })
            .clone()
    })
}

fn current() -> Option<SharedDispatcher> {
    DISPATCHER.with(|slot| slot.borrow().clone())
}

pub fn is_running() -> bool {
    current().is_some()
}

pub fn register(key: &str, consumer_id: &str, handler: Handler, options: ShortcutOptions) {
    dispatcher().with(|d| d.register(key, consumer_id, handler, options));
}

pub fn unregister(key: &str, consumer_id: &str) {
    if let Some(dispatcher) = current() {
        dispatcher.with(|d| d.unregister(key, consumer_id));
    }
}

pub fn unregister_all(consumer_id: &str) {
    if let Some(dispatcher) = current() {
        dispatcher.with(|d| d.unregister_all(consumer_id));
    }
}

/// Tear the dispatcher down: stop listening, cancel the chord timer, drop
/// every registration
pub fn shutdown() {
    let previous = DISPATCHER.with(|slot| slot.borrow_mut().take());
    if let Some(dispatcher) = previous {
        dispatcher.with(|d| d.shutdown());
    }
}

/// Route a key event through the dispatcher. Call this before any other key
/// handling and drop the event if it comes back consumed.
pub fn handle_key_event(event: &mut ShortcutEvent) -> Dispatch {
    match current() {
        Some(dispatcher) => dispatcher.handle_key_event(event),
        None => Dispatch::Detached,
    }
}

pub fn fire_due_timers() -> bool {
    current().is_some_and(|d| d.fire_due_timers())
}

pub fn next_deadline() -> Option<Instant> {
    current().and_then(|d| d.next_deadline())
}

pub fn is_prefix_armed() -> bool {
    current().is_some_and(|d| d.is_prefix_armed())
}

/// Label of the most recent key the dispatcher saw
pub fn last_key() -> Option<String> {
    current().and_then(|d| d.with(|d| d.last_key().map(str::to_string)))
}

pub fn registrations() -> Vec<RegistrationInfo> {
    current().map_or_else(Vec::new, |d| d.with(|d| d.registrations()))
}

pub fn format_debug_info() -> String {
    current().map_or_else(
        || "No shortcut dispatcher running\n".to_string(),
        |d| d.with(|d| d.format_debug_info()),
    )
}

/// Handle to the process-wide dispatcher
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalRouter;

impl ShortcutRouter for GlobalRouter {
    fn register(&self, key: &str, consumer_id: &str, handler: Handler, options: ShortcutOptions) {
        register(key, consumer_id, handler, options);
    }

    fn unregister(&self, key: &str, consumer_id: &str) {
        unregister(key, consumer_id);
    }

    fn unregister_all(&self, consumer_id: &str) {
        unregister_all(consumer_id);
    }

    fn shutdown(&self) {
        shutdown();
    }
}
