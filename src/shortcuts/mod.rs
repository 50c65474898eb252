//! Keyboard shortcut routing
//!
//! Independent consumers register key bindings (including `ctrl+x` chords)
//! with a priority and an optional condition; one dispatcher sees every key
//! press first and invokes the matching handlers in priority order.

pub mod chord;
pub mod dispatcher;
pub mod event;
pub mod global;
pub mod key_names;
pub mod registry;
pub mod router;
pub mod scope;

pub use chord::{ChordTimer, Clock, ManualClock, SystemClock, DEFAULT_CHORD_TIMEOUT};
pub use dispatcher::{Dispatch, DispatcherConfig, SharedDispatcher, ShortcutDispatcher};
pub use event::ShortcutEvent;
pub use global::GlobalRouter;
pub use registry::{handler, Handler, Propagation, RegistrationInfo, ShortcutOptions};
pub use router::ShortcutRouter;
pub use scope::{Shortcut, ShortcutScope};
