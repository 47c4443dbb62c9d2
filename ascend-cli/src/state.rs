use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$ASCEND_HOME`, or `~/.ascend`.
pub fn ascend_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ASCEND_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ascend"))
}

pub fn ensure_ascend_home() -> Result<PathBuf> {
    let dir = ascend_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn admin_log_path() -> Result<PathBuf> {
    Ok(ensure_ascend_home()?.join("admin.log"))
}
