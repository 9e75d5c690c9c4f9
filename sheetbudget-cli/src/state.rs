use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$SHEETBUDGET_HOME`, or `~/.sheetbudget`.
pub fn sheetbudget_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SHEETBUDGET_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".sheetbudget"))
}

pub fn ensure_sheetbudget_home() -> Result<PathBuf> {
    let dir = sheetbudget_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
