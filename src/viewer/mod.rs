//! A small document viewer shell whose components drive the shortcut router

pub mod canvas;
pub mod markdown_dialog;
pub mod page_input;
pub mod render;
pub mod state;

pub use canvas::PageCanvas;
pub use markdown_dialog::MarkdownDialog;
pub use state::{DialogState, FitMode, MarkdownSink, SystemSink, ViewerState};
