use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use crate::utils::logging::LogEntry;

/// Global file logger instance
static FILE_LOGGER: OnceLock<FileLogger> = OnceLock::new();

/// Cross-platform log directory
fn get_log_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("pdf-keys").join("logs"),
        None => std::env::temp_dir().join("pdf-keys"),
    }
}

/// Appends formatted log entries to a timestamped file
pub struct FileLogger {
    log_file: Arc<Mutex<Option<File>>>,
    log_path: PathBuf,
}

impl FileLogger {
    pub fn new() -> Self {
        Self::in_dir(get_log_dir())
    }

    pub fn in_dir(log_dir: PathBuf) -> Self {
        let _ = std::fs::create_dir_all(&log_dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("pdf-keys_{}.log", timestamp));

        let latest_path = log_dir.join("latest.log");

        #[cfg(unix)]
        {
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        #[cfg(windows)]
        {
            // Symlinks need elevated rights on Windows; leave a pointer file instead
            let pointer_content = format!("Current log file: {}\n", log_path.display());
            let _ = std::fs::write(&latest_path, pointer_content);
        }

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok();

        Self {
            log_file: Arc::new(Mutex::new(log_file)),
            log_path,
        }
    }

    pub fn write_entry(&self, entry: &LogEntry) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = writeln!(file, "{}", entry.format_for_display());
                let _ = file.flush();
            }
        }

        if std::env::var("PDF_KEYS_DEBUG").is_ok() {
            eprintln!("{}", entry.format_for_display());
        }
    }

    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }

    pub fn flush(&self) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = file.flush();
            }
        }
    }
}

impl Default for FileLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize the global file logger
pub fn init_file_logger() -> &'static FileLogger {
    FILE_LOGGER.get_or_init(FileLogger::new)
}
