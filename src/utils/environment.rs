use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

use crate::store::{DEFAULT_UNDO_WINDOW_SECS, MAX_UNDO_WINDOW_SECS, UnlockGate};

pub const DATA_DIR_VAR: &str = "MOMENTO_HOME";
pub const PASSPHRASE_VAR: &str = "MOMENTO_PASSPHRASE";
pub const UNDO_WINDOW_VAR: &str = "MOMENTO_UNDO_WINDOW_SECS";

/// Get the data directory: `$MOMENTO_HOME`, else the platform data dir
pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(DATA_DIR_VAR).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::data_dir().context("Failed to get platform data directory")?;
    Ok(base.join("momento"))
}

/// Build the unlock gate from `$MOMENTO_PASSPHRASE` (unset means date only)
pub fn get_unlock_gate() -> UnlockGate {
    match env::var(PASSPHRASE_VAR) {
        Ok(passphrase) if !passphrase.is_empty() => UnlockGate::with_passphrase(passphrase),
        _ => UnlockGate::date_only(),
    }
}

/// Read the undo window from `$MOMENTO_UNDO_WINDOW_SECS`
pub fn get_undo_window() -> Result<Duration> {
    match env::var(UNDO_WINDOW_VAR) {
        Ok(raw) => parse_undo_window(&raw),
        Err(_) => Ok(Duration::seconds(DEFAULT_UNDO_WINDOW_SECS)),
    }
}

fn parse_undo_window(raw: &str) -> Result<Duration> {
    let secs: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds, got '{}'", UNDO_WINDOW_VAR, raw))?;
    if secs < 0 {
        bail!("{} cannot be negative, got {}", UNDO_WINDOW_VAR, secs);
    }
    if secs > MAX_UNDO_WINDOW_SECS {
        bail!("{} cannot exceed {} seconds, got {}", UNDO_WINDOW_VAR, MAX_UNDO_WINDOW_SECS, secs);
    }
    Duration::try_seconds(secs)
        .with_context(|| format!("{} is out of range: {}", UNDO_WINDOW_VAR, secs))
}
