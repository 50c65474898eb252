use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use pdf_keys::config::config::Config;
use pdf_keys::shortcuts::{global, Dispatch, DispatcherConfig, ShortcutEvent};
use pdf_keys::utils::app_paths::AppPaths;
use pdf_keys::utils::logging::{get_log_buffer, init_tracing};
use pdf_keys::viewer::render::{self, KeyIndicator};
use pdf_keys::viewer::{MarkdownDialog, MarkdownSink, PageCanvas, SystemSink, ViewerState};

const IDLE_POLL: Duration = Duration::from_millis(250);

/// Puts the terminal back on every exit path out of `run`, including `?` and panics
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen).context("entering alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    }
}

fn print_help() {
    println!("{}", "pdf-keys - chorded shortcut viewer".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  pdf-keys [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}        - Number of pages in the document", "--pages N".green());
    println!("  {} - Markdown shown in the dialog", "--markdown FILE".green());
    println!("  {}      - Initialize configuration with wizard", "--init-config".green());
    println!("  {}  - Generate config file with defaults", "--generate-config".green());
    println!("  {}       - Print the chord state on exit", "--debug-keys".green());
    println!();
    println!("{}", "Keys:".yellow());
    println!("  {}   - Previous / next page", "Up / Down".green());
    println!("  {}         - Type a page number", "0-9".green());
    println!("  {}    - Open the markdown dialog", "Ctrl+X M".green());
    println!("  {}    - Toggle fit width / height", "Ctrl+X F".green());
    println!("  {}    - Copy markdown (dialog open)", "Ctrl+X C".green());
    println!("  {}    - Save markdown (dialog open)", "Ctrl+X S".green());
    println!("  {}         - Close the dialog", "Esc".green());
    println!("  {}         - Pretend a text field has focus", "Tab".green());
    println!("  {}    - Quit", "q / Ctrl+C".green());
    println!();
}

struct Args {
    pages: usize,
    markdown: Option<PathBuf>,
    debug_keys: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args {
        pages: 10,
        markdown: None,
        debug_keys: false,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pages" => {
                let value = iter.next().context("--pages needs a value")?;
                parsed.pages = value
                    .parse()
                    .with_context(|| format!("invalid page count '{}'", value))?;
            }
            "--markdown" => {
                let value = iter.next().context("--markdown needs a file")?;
                parsed.markdown = Some(PathBuf::from(value));
            }
            "--debug-keys" => parsed.debug_keys = true,
            other => bail!("unknown argument '{}'", other),
        }
    }
    Ok(parsed)
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.contains(&"--init-config".to_string()) {
        let config = Config::init_wizard()?;
        println!("\nConfiguration initialized successfully!");
        if !config.display.use_glyphs {
            println!("Note: Simple mode enabled (ASCII icons)");
        }
        return Ok(());
    }

    if args.contains(&"--generate-config".to_string()) {
        return generate_config();
    }

    let args = parse_args(&args)?;
    let config = Config::load()?;

    if let Some(log_path) = init_tracing(&config.logging) {
        eprintln!("📝 Debug logs will be written to:");
        eprintln!("   {}", log_path.display());
        eprintln!("   Tail with: tail -f {}", log_path.display());
    }

    global::init(DispatcherConfig::from_config(&config.shortcuts));
    info!(
        "pdf-keys starting: {} pages, prefix {}",
        args.pages, config.shortcuts.chord_prefix
    );

    let result = run(&config, &args);

    if args.debug_keys {
        eprintln!("{}", global::format_debug_info());
    }
    global::shutdown();
    result
}

fn run(config: &Config, args: &Args) -> Result<()> {
    let state = Rc::new(RefCell::new(ViewerState::new(args.pages, &config.viewer)));
    if let Some(path) = &args.markdown {
        let markdown = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        state.borrow_mut().dialog.markdown = Some(markdown);
    }

    let save_dir = match &config.viewer.save_dir {
        Some(dir) => dir.clone(),
        None => AppPaths::markdown_dir()?,
    };
    let sink: Rc<dyn MarkdownSink> = Rc::new(SystemSink::new(save_dir));

    let canvas = PageCanvas::mount(state.clone());
    let dialog = MarkdownDialog::mount(state.clone(), sink);

    let result = {
        let _guard = TerminalGuard::enter()?;
        Terminal::new(CrosstermBackend::new(io::stdout()))
            .map_err(anyhow::Error::from)
            .and_then(|mut terminal| event_loop(&mut terminal, config, &state))
    };

    dialog.unmount();
    canvas.unmount();
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
    state: &Rc<RefCell<ViewerState>>,
) -> Result<()> {
    let prefix = config.shortcuts.prefix_binding().label();

    loop {
        let last_key = global::last_key();
        let logs = get_log_buffer()
            .map(|buffer| buffer.get_recent(config.display.log_lines))
            .unwrap_or_default();
        terminal.draw(|frame| {
            let indicator = KeyIndicator {
                prefix: &prefix,
                armed: global::is_prefix_armed(),
                last_key: last_key.as_deref(),
            };
            render::draw(frame, &state.borrow(), &indicator, &logs, &config.display);
        })?;

        if event::poll(poll_timeout(state))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                let mut event = ShortcutEvent::new(key);
                let outcome = global::handle_key_event(&mut event);
                if event.is_consumed() || outcome == Dispatch::PrefixArmed {
                    continue;
                }

                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Tab => {
                        let mut state = state.borrow_mut();
                        state.input_focused = !state.input_focused;
                        debug!("input focus: {}", state.input_focused);
                    }
                    _ => {}
                }
            }
        }

        global::fire_due_timers();
        state.borrow_mut().tick();
    }

    Ok(())
}

/// Sleep until the nearest pending deadline, or the idle interval
fn poll_timeout(state: &Rc<RefCell<ViewerState>>) -> Duration {
    let now = Instant::now();
    [global::next_deadline(), state.borrow().page_input.deadline()]
        .into_iter()
        .flatten()
        .map(|deadline| deadline.saturating_duration_since(now))
        .fold(IDLE_POLL, Duration::min)
}
