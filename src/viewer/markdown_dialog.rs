use std::cell::RefCell;
use std::rc::Rc;

use tracing::{info, warn};

use super::state::{MarkdownSink, ViewerState};
use crate::shortcuts::{GlobalRouter, Shortcut, ShortcutRouter, ShortcutScope};

/// Shortcuts of the markdown dialog. They outrank the canvas and only apply
/// while the dialog is open.
pub struct MarkdownDialog<R: ShortcutRouter = GlobalRouter> {
    state: Rc<RefCell<ViewerState>>,
    sink: Rc<dyn MarkdownSink>,
    scope: ShortcutScope<R>,
}

impl MarkdownDialog<GlobalRouter> {
    pub fn mount(state: Rc<RefCell<ViewerState>>, sink: Rc<dyn MarkdownSink>) -> Self {
        Self::mount_with(state, sink, GlobalRouter)
    }
}

impl<R: ShortcutRouter> MarkdownDialog<R> {
    pub fn mount_with(state: Rc<RefCell<ViewerState>>, sink: Rc<dyn MarkdownSink>, router: R) -> Self {
        let mut dialog = Self {
            state,
            sink,
            scope: ShortcutScope::with_router(router),
        };
        dialog.bind();
        dialog
    }

    pub fn bind(&mut self) {
        let shortcuts = vec![self.copy(), self.save(), self.close()];
        self.scope.bind(shortcuts);
    }

    fn can_export(&self) -> impl Fn() -> bool + 'static {
        let state = self.state.clone();
        move || state.borrow().dialog.can_export()
    }

    fn copy(&self) -> Shortcut {
        let state = self.state.clone();
        let sink = self.sink.clone();
        Shortcut::new("ctrl+x+c", move |event| {
            let mut state = state.borrow_mut();
            let Some(markdown) = state.dialog.markdown.clone() else {
                return;
            };
            if state.dialog.converting {
                return;
            }
            event.prevent_default();
            event.stop_propagation();

            match sink.copy(&markdown) {
                Ok(()) => {
                    info!("MarkdownDialog: copied {} bytes", markdown.len());
                    state.status = Some("Markdown copied to clipboard".into());
                }
                Err(e) => {
                    warn!("MarkdownDialog: copy failed: {:#}", e);
                    state.status = Some(format!("Copy failed: {}", e));
                }
            }
        })
        .when(self.can_export())
        .priority(20)
    }

    fn save(&self) -> Shortcut {
        let state = self.state.clone();
        let sink = self.sink.clone();
        Shortcut::new("ctrl+x+s", move |event| {
            let mut state = state.borrow_mut();
            let Some(markdown) = state.dialog.markdown.clone() else {
                return;
            };
            if state.dialog.converting {
                return;
            }
            event.prevent_default();
            event.stop_propagation();

            match sink.save(&markdown) {
                Ok(path) => {
                    info!("MarkdownDialog: saved to {}", path.display());
                    state.status = Some(format!("Saved {}", path.display()));
                    state.dialog.last_saved = Some(path);
                }
                Err(e) => {
                    warn!("MarkdownDialog: save failed: {:#}", e);
                    state.status = Some(format!("Save failed: {}", e));
                }
            }
        })
        .when(self.can_export())
        .priority(20)
    }

    fn close(&self) -> Shortcut {
        let state = self.state.clone();
        let is_open = {
            let state = self.state.clone();
            move || state.borrow().dialog.open
        };
        Shortcut::new("escape", move |event| {
            let mut state = state.borrow_mut();
            if state.dialog.open {
                event.prevent_default();
                state.dialog.open = false;
            }
        })
        .when(is_open)
        .priority(20)
    }

    pub fn unmount(mut self) {
        self.scope.release();
    }
}
