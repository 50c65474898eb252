use super::dispatcher::SharedDispatcher;
use super::registry::{Handler, ShortcutOptions};

/// The narrow surface consumers bind through.
///
/// Implemented by the process-wide [`GlobalRouter`](super::global::GlobalRouter)
/// and by [`SharedDispatcher`], which tests use as a private stand-in.
pub trait ShortcutRouter {
    fn register(&self, key: &str, consumer_id: &str, handler: Handler, options: ShortcutOptions);

    fn unregister(&self, key: &str, consumer_id: &str);

    fn unregister_all(&self, consumer_id: &str);

    fn shutdown(&self);
}

impl ShortcutRouter for SharedDispatcher {
    fn register(&self, key: &str, consumer_id: &str, handler: Handler, options: ShortcutOptions) {
        self.with(|d| d.register(key, consumer_id, handler, options));
    }

    fn unregister(&self, key: &str, consumer_id: &str) {
        self.with(|d| d.unregister(key, consumer_id));
    }

    fn unregister_all(&self, consumer_id: &str) {
        self.with(|d| d.unregister_all(consumer_id));
    }

    fn shutdown(&self) {
        self.with(|d| d.shutdown());
    }
}
