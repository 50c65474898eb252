use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

pub struct AppPaths;

impl AppPaths {
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Cannot determine data directory"))?
            .join("pdf-keys");

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    /// Directory markdown exports are written to
    pub fn markdown_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?.join("markdown");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
