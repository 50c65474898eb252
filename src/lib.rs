pub mod config;
pub mod shortcuts;
pub mod utils;
pub mod viewer;
