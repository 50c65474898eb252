use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use super::state::ViewerState;
use crate::shortcuts::{GlobalRouter, Shortcut, ShortcutRouter, ShortcutScope};

/// Page canvas shortcuts: chords for the dialog and fit mode, arrows and
/// digits for page navigation
pub struct PageCanvas<R: ShortcutRouter = GlobalRouter> {
    state: Rc<RefCell<ViewerState>>,
    scope: ShortcutScope<R>,
}

impl PageCanvas<GlobalRouter> {
    pub fn mount(state: Rc<RefCell<ViewerState>>) -> Self {
        Self::mount_with(state, GlobalRouter)
    }
}

impl<R: ShortcutRouter> PageCanvas<R> {
    pub fn mount_with(state: Rc<RefCell<ViewerState>>, router: R) -> Self {
        let mut canvas = Self {
            state,
            scope: ShortcutScope::with_router(router),
        };
        canvas.bind();
        canvas
    }

    pub fn consumer_id(&self) -> &str {
        self.scope.id()
    }

    /// (Re)register every canvas shortcut
    pub fn bind(&mut self) {
        let mut shortcuts = vec![
            self.open_markdown(),
            self.toggle_fit(),
            self.step_page("arrowup", -1),
            self.step_page("arrowdown", 1),
        ];
        shortcuts.extend(('0'..='9').map(|digit| self.page_digit(digit)));
        self.scope.bind(shortcuts);
    }

    fn open_markdown(&self) -> Shortcut {
        let state = self.state.clone();
        Shortcut::new("ctrl+x+m", move |event| {
            event.prevent_default();
            event.stop_propagation();
            state.borrow_mut().dialog.open = true;
            debug!("PageCanvas: markdown dialog opened");
        })
        .priority(10)
    }

    fn toggle_fit(&self) -> Shortcut {
        let state = self.state.clone();
        Shortcut::new("ctrl+x+f", move |event| {
            event.prevent_default();
            event.stop_propagation();
            state.borrow_mut().toggle_fit_mode();
        })
        .priority(10)
    }

    fn step_page(&self, key: &str, delta: isize) -> Shortcut {
        let state = self.state.clone();
        Shortcut::new(key, move |event| {
            let mut state = state.borrow_mut();
            if state.input_focused {
                return;
            }
            event.prevent_default();

            let current = state.current_page;
            if current < 1 || current > state.pages {
                return;
            }
            if let Some(target) = current.checked_add_signed(delta) {
                state.scroll_to_page(target);
            }
        })
        .priority(8)
    }

    fn page_digit(&self, digit: char) -> Shortcut {
        let state = self.state.clone();
        Shortcut::new(&digit.to_string(), move |event| {
            let mut state = state.borrow_mut();
            if state.input_focused {
                return;
            }
            event.prevent_default();

            let now = state.clock().now();
            if let Some(page) = state.page_input.push_digit(digit, now) {
                state.scroll_to_page(page);
            }
        })
        .priority(5)
    }

    pub fn unmount(mut self) {
        self.scope.release();
    }
}
