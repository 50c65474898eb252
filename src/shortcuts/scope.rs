use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use super::event::ShortcutEvent;
use super::global::GlobalRouter;
use super::registry::{handler, Handler, Propagation, ShortcutOptions};
use super::router::ShortcutRouter;

static NEXT_CONSUMER: AtomicU64 = AtomicU64::new(1);

/// A fresh consumer id, unique for the life of the process
pub fn next_consumer_id() -> String {
    format!("shortcut-{}", NEXT_CONSUMER.fetch_add(1, Ordering::Relaxed))
}

/// One binding a consumer wants: key, handler, priority and condition
pub struct Shortcut {
    pub key: String,
    handler: Handler,
    options: ShortcutOptions,
}

impl Shortcut {
    pub fn new<F, R>(key: &str, f: F) -> Self
    where
        F: Fn(&mut ShortcutEvent) -> R + 'static,
        R: Into<Propagation>,
    {
        Self {
            key: key.to_string(),
            handler: handler(f),
            options: ShortcutOptions::default(),
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.options = self.options.priority(priority);
        self
    }

    pub fn when<C>(mut self, condition: C) -> Self
    where
        C: Fn() -> bool + 'static,
    {
        self.options = self.options.when(condition);
        self
    }
}

/// The shortcuts of one consumer, tied to the consumer's lifetime.
///
/// `bind` replaces the whole set (call it again whenever the state the
/// closures capture changes); dropping the scope removes everything it bound.
pub struct ShortcutScope<R: ShortcutRouter = GlobalRouter> {
    id: String,
    router: R,
    bound: bool,
}

impl ShortcutScope<GlobalRouter> {
    pub fn new() -> Self {
        Self::with_router(GlobalRouter)
    }
}

impl Default for ShortcutScope<GlobalRouter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ShortcutRouter> ShortcutScope<R> {
    pub fn with_router(router: R) -> Self {
        Self {
            id: next_consumer_id(),
            router,
            bound: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn bind(&mut self, shortcuts: impl IntoIterator<Item = Shortcut>) {
        self.router.unregister_all(&self.id);
        let mut count = 0;
        for shortcut in shortcuts {
            self.router
                .register(&shortcut.key, &self.id, shortcut.handler, shortcut.options);
            count += 1;
        }
        self.bound = true;
        trace!("ShortcutScope {}: bound {} shortcuts", self.id, count);
    }

    /// Remove everything this scope registered. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.bound {
            self.router.unregister_all(&self.id);
            self.bound = false;
            trace!("ShortcutScope {}: released", self.id);
        }
    }
}

impl<R: ShortcutRouter> Drop for ShortcutScope<R> {
    fn drop(&mut self) {
        self.release();
    }
}
