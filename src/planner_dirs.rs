//! Centralized filesystem paths for the planner.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! # Directory Layout
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/weekplan/` | `~/.local/share/weekplan/` |
//! | Config | `~/Library/Application Support/weekplan/` | `~/.config/weekplan/` |
//!
//! # Environment Overrides
//!
//! - `WEEKPLAN_DATA_DIR` overrides [`data_dir`]
//! - `WEEKPLAN_CONFIG_DIR` overrides [`config_dir`]
//! - `WEEKPLAN_DB_PATH` points straight at a database file
//! - `PORTABLE_EXECUTABLE_DIR` (set by portable Windows launchers) keeps the
//!   database next to the executable

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Database filename inside whichever directory is chosen.
pub const DB_FILENAME: &str = "weekly-burnout-blocker.db";

/// Application data root directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("WEEKPLAN_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("weekplan"))
        .unwrap_or_else(|| PathBuf::from("/tmp/weekplan-data"))
}

/// Application config directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("WEEKPLAN_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("weekplan"))
        .unwrap_or_else(|| PathBuf::from("/tmp/weekplan-config"))
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Resolve the database file from the process environment.
///
/// An explicit path (from config) wins, then `WEEKPLAN_DB_PATH`, then
/// `PORTABLE_EXECUTABLE_DIR`, then the data directory.
#[must_use]
pub fn db_path(explicit: Option<&Path>) -> PathBuf {
    resolve_db_path(explicit, |name| std::env::var_os(name), data_dir)
}

/// [`db_path`] with the environment and data dir injected.
pub(crate) fn resolve_db_path(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<OsString>,
    data_dir: impl FnOnce() -> PathBuf,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = env("WEEKPLAN_DB_PATH").filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(dir) = env("PORTABLE_EXECUTABLE_DIR").filter(|p| !p.is_empty()) {
        return PathBuf::from(dir).join(DB_FILENAME);
    }
    data_dir().join(DB_FILENAME)
}
