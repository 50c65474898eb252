//! Utility functions and helpers
//!
//! Logging setup and application paths.

pub mod app_paths;
pub mod log_file;
pub mod logging;
