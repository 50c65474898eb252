use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;

use super::page_input::PageInput;
use crate::config::config::ViewerConfig;
use crate::shortcuts::chord::{Clock, SystemClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    Height,
    Width,
}

impl FitMode {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("width") {
            FitMode::Width
        } else {
            FitMode::Height
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            FitMode::Height => FitMode::Width,
            FitMode::Width => FitMode::Height,
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitMode::Height => f.write_str("height"),
            FitMode::Width => f.write_str("width"),
        }
    }
}

/// The markdown dialog's view of the world
#[derive(Debug, Clone, Default)]
pub struct DialogState {
    pub open: bool,
    pub markdown: Option<String>,
    pub converting: bool,
    pub last_saved: Option<PathBuf>,
}

impl DialogState {
    /// Copy and save only make sense for finished markdown in an open dialog
    pub fn can_export(&self) -> bool {
        self.open && self.markdown.is_some() && !self.converting
    }
}

/// Everything the viewer's shortcut consumers read and change
pub struct ViewerState {
    pub pages: usize,
    pub current_page: usize,
    pub fit_mode: FitMode,
    /// A text field has focus; page keys stay out of its way
    pub input_focused: bool,
    pub page_input: PageInput,
    pub dialog: DialogState,
    pub status: Option<String>,
    clock: Rc<dyn Clock>,
}

impl ViewerState {
    pub fn new(pages: usize, config: &ViewerConfig) -> Self {
        Self::with_clock(pages, config, Rc::new(SystemClock))
    }

    pub fn with_clock(pages: usize, config: &ViewerConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            pages,
            current_page: if pages > 0 { 1 } else { 0 },
            fit_mode: FitMode::parse(&config.fit_mode),
            input_focused: false,
            page_input: PageInput::new(config.page_input_timeout_ms),
            dialog: DialogState::default(),
            status: None,
            clock,
        }
    }

    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    /// Jump to a page if it exists. Returns whether the page changed.
    pub fn scroll_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.pages {
            return false;
        }
        if page != self.current_page {
            info!("Viewer: page {} -> {}", self.current_page, page);
        }
        self.current_page = page;
        true
    }

    pub fn toggle_fit_mode(&mut self) {
        self.fit_mode = self.fit_mode.toggled();
        info!("Viewer: fit mode {}", self.fit_mode);
    }

    /// Drop stale page digits; called from the host loop
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.page_input.expire(now);
    }
}

/// Where the markdown dialog sends copied and saved text
pub trait MarkdownSink {
    fn copy(&self, markdown: &str) -> Result<()>;

    fn save(&self, markdown: &str) -> Result<PathBuf>;
}

/// Clipboard via arboard, files in a directory
pub struct SystemSink {
    save_dir: PathBuf,
}

impl SystemSink {
    pub fn new(save_dir: PathBuf) -> Self {
        Self { save_dir }
    }
}

impl MarkdownSink for SystemSink {
    fn copy(&self, markdown: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("opening clipboard")?;
        clipboard
            .set_text(markdown.to_string())
            .context("writing clipboard")?;
        Ok(())
    }

    fn save(&self, markdown: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.save_dir)?;
        let name = format!("document_{}.md", chrono::Local::now().format("%Y%m%d_%H%M%S"));
        let path = self.save_dir.join(name);
        std::fs::write(&path, markdown)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}
