//! Configuration module
//!
//! Settings file handling and key binding notation.

pub mod config;
pub mod key_bindings;

pub use config::Config;
pub use key_bindings::KeyBinding;
