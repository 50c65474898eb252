use chrono::Local;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::config::LoggingConfig;
use crate::utils::log_file::{self, FileLogger};

/// Maximum number of log entries to keep in memory
const MAX_LOG_ENTRIES: usize = 1000;

/// A log entry with timestamp and message
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S.%3f").to_string(),
            level: level.to_string().to_uppercase(),
            target: target.to_string(),
            message,
        }
    }

    /// Format for display in the status screen
    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Thread-safe ring buffer for log entries
#[derive(Clone)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl LogRingBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOG_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() >= self.capacity {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().rev().take(count).rev().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LogRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a compact-format line ("LEVEL target: message") into its parts
fn parse_compact_line(line: &str) -> (Level, &str, &str) {
    let (level, rest) = if let Some(rest) = line.strip_prefix("TRACE ") {
        (Level::TRACE, rest)
    } else if let Some(rest) = line.strip_prefix("DEBUG ") {
        (Level::DEBUG, rest)
    } else if let Some(rest) = line.strip_prefix("INFO ") {
        (Level::INFO, rest)
    } else if let Some(rest) = line.strip_prefix("WARN ") {
        (Level::WARN, rest)
    } else if let Some(rest) = line.strip_prefix("ERROR ") {
        (Level::ERROR, rest)
    } else {
        return (Level::INFO, "general", line);
    };

    let rest = rest.trim_start();
    match rest.split_once(": ") {
        // A target never contains spaces
        Some((target, message)) if !target.contains(' ') => (level, target, message.trim()),
        _ => (level, "general", rest),
    }
}

/// Writer that feeds the ring buffer and, when enabled, the log file
#[derive(Clone)]
pub struct LogWriter {
    buffer: LogRingBuffer,
    file: Option<&'static FileLogger>,
}

impl LogWriter {
    pub fn new(buffer: LogRingBuffer, file: Option<&'static FileLogger>) -> Self {
        Self { buffer, file }
    }
}

impl std::io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(message) = std::str::from_utf8(buf) {
            for line in message.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let (level, target, msg) = parse_compact_line(line);
                let entry = LogEntry::new(level, target, msg.to_string());
                if let Some(file) = self.file {
                    file.write_entry(&entry);
                }
                self.buffer.push(entry);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(file) = self.file {
            file.flush();
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Global log buffer accessible throughout the application
static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();

/// Initialize the global log buffer
pub fn init_log_buffer() -> LogRingBuffer {
    LOG_BUFFER.get_or_init(LogRingBuffer::new).clone()
}

/// Get the global log buffer
pub fn get_log_buffer() -> Option<LogRingBuffer> {
    LOG_BUFFER.get().cloned()
}

/// Initialize tracing into the ring buffer and, if configured, a log file.
/// Returns the log file path when file logging is on.
pub fn init_tracing(config: &LoggingConfig) -> Option<PathBuf> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let buffer = init_log_buffer();
    let file = config.log_to_file.then(log_file::init_file_logger);

    let fmt_layer = fmt::layer()
        .with_writer(LogWriter::new(buffer, file))
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time() // We add our own timestamps
        .compact();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // A second init (tests, embedding apps) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    file.map(|f| f.log_path().clone())
}
