use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the blankline config directory, creating it if needed
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("blankline");

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory at {}", config_dir.display()))?;

    Ok(config_dir)
}

pub fn finder_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("finder.toml"))
}
