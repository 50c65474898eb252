use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::key_bindings::KeyBinding;
use crossterm::event::KeyCode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub shortcuts: ShortcutConfig,
    pub viewer: ViewerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs in the status screen
    pub use_glyphs: bool,

    /// Show the armed chord prefix and last key in the status line
    pub show_key_indicator: bool,

    /// Number of recent log lines shown in the status screen
    pub log_lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    /// Key combination that starts a chord, e.g. "ctrl+x"
    pub chord_prefix: String,

    /// How long the prefix stays armed waiting for the second key
    pub chord_timeout_ms: u64,

    /// Number of key presses kept for the debug view
    pub key_history: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Digits typed within this window accumulate into one page number
    pub page_input_timeout_ms: u64,

    /// "height" or "width"
    pub fit_mode: String,

    /// Where ctrl+x s writes the markdown (defaults to the data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    pub level: String,

    /// Also write logs to a file under the data directory
    pub log_to_file: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_key_indicator: true,
            log_lines: 8,
        }
    }
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            chord_prefix: "ctrl+x".to_string(),
            chord_timeout_ms: 1000,
            key_history: 50,
        }
    }
}

impl ShortcutConfig {
    /// The configured prefix, or ctrl+x if it does not parse
    pub fn prefix_binding(&self) -> KeyBinding {
        match KeyBinding::parse(&self.chord_prefix) {
            Ok(binding) => binding,
            Err(e) => {
                warn!(
                    "Invalid chord_prefix '{}': {}; using ctrl+x",
                    self.chord_prefix, e
                );
                KeyBinding::with_ctrl(KeyCode::Char('x'))
            }
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            page_input_timeout_ms: 500,
            fit_mode: "height".to_string(),
            save_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: true,
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine config directory"))?;

        Ok(config_dir.join("pdf-keys").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# pdf-keys Configuration File
# Location: ~/.config/pdf-keys/config.toml (Linux)
#           ~/Library/Application Support/pdf-keys/config.toml (macOS)
#           %APPDATA%\pdf-keys\config.toml (Windows)

[display]
# Use Unicode glyphs in the status screen
use_glyphs = true

# Show the armed chord prefix and the last key pressed
show_key_indicator = true

# Recent log lines shown at the bottom of the screen
log_lines = 8

[shortcuts]
# Key combination that starts a two-key chord
# (chord shortcuts are named "<prefix>+<key>", e.g. "ctrl+x+m")
chord_prefix = "ctrl+x"

# How long the prefix waits for the second key, in milliseconds
chord_timeout_ms = 1000

# Key presses remembered for the debug view
key_history = 50

[viewer]
# Digits typed within this many milliseconds form one page number
page_input_timeout_ms = 500

# Initial fit mode: "height" or "width"
fit_mode = "height"

# Directory for saved markdown (leave commented to use the data directory)
# save_dir = "/path/to/markdown"

[logging]
# Default log filter when RUST_LOG is not set
level = "info"

# Write logs to ~/.local/share/pdf-keys/logs
log_to_file = true
"#
        .to_string()
    }

    /// Initialize config with a setup wizard
    pub fn init_wizard() -> Result<Self> {
        println!("pdf-keys Configuration Setup");
        println!("============================");

        print!("Does your terminal support Unicode glyphs? (y/n) [y]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        let mut config = Config::default();
        config.display.use_glyphs = !input.trim().eq_ignore_ascii_case("n");

        print!("Chord prefix [ctrl+x]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        let prefix = input.trim();
        if !prefix.is_empty() {
            KeyBinding::parse(prefix)?;
            config.shortcuts.chord_prefix = prefix.to_lowercase();
        }

        config.save()?;

        println!("\nConfiguration saved to: {:?}", Config::get_config_path()?);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }
}
