//! Configuration types for the planner.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PlannerError, Result};

/// Top-level planner configuration, stored as TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Task database settings.
    pub storage: StorageConfig,
    /// Diagnostic output settings.
    pub logging: LoggingConfig,
}

/// Task database configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. `None` resolves from the environment, see
    /// [`crate::planner_dirs::db_path`].
    pub db_path: Option<PathBuf>,
    /// Insert the sample week on startup.
    pub seed_demo_week: bool,
}

impl StorageConfig {
    /// The database file this config points at.
    #[must_use]
    pub fn resolved_db_path(&self) -> PathBuf {
        crate::planner_dirs::db_path(self.db_path.as_deref())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Also write a daily-rotated log file under the logs directory.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            file: false,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PlannerError::Config(e.to_string()))
    }

    /// Like [`Self::from_file`], but a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Save configuration to a TOML file, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be
    /// serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| PlannerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `config_dir()/config.toml`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        crate::planner_dirs::config_file()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.logging.filter, "info");
        assert!(!config.logging.file);
        assert!(config.storage.db_path.is_none());
        assert!(!config.storage.seed_demo_week);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = PlannerConfig::default();
        config.storage.db_path = Some(PathBuf::from("/srv/planner.db"));
        config.logging.filter = "weekplan=debug".to_owned();

        config.save_to_file(&path).expect("save");
        let loaded = PlannerConfig::from_file(&path).expect("load");
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.storage.resolved_db_path(),
            PathBuf::from("/srv/planner.db")
        );
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nseed_demo_week = true\n").expect("write");

        let loaded = PlannerConfig::from_file(&path).expect("load");
        assert!(loaded.storage.seed_demo_week);
        assert_eq!(loaded.logging, LoggingConfig::default());
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = PlannerConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let loaded =
            PlannerConfig::load_or_default(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(loaded, PlannerConfig::default());
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").expect("write");

        let err = PlannerConfig::from_file(&path).expect_err("parse must fail");
        assert!(matches!(err, PlannerError::Config(_)));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = PlannerConfig::default_config_path();
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }
}
