//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/highscore/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/highscore/` (~/.config/highscore/)
//! - State/Logs: `$XDG_STATE_HOME/highscore/` (~/.local/state/highscore/)

use crate::achievements::{MedalCatalog, MedalCategory};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Achievement threshold overrides
    #[serde(default)]
    pub achievements: AchievementsConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Achievement configuration: optional per-category threshold overrides.
///
/// Keys are category identifiers (`sessions`, `streak`, ...); values are
/// the replacement threshold ladders. Categories not listed keep their
/// built-in defaults.
#[derive(Debug, Deserialize, Default)]
pub struct AchievementsConfig {
    #[serde(default)]
    pub thresholds: HashMap<String, Vec<f64>>,
}

impl AchievementsConfig {
    /// Build the medal catalog described by this config.
    ///
    /// Unknown category names are a configuration error rather than a
    /// silent no-op so typos surface at load time.
    pub fn medal_catalog(&self) -> Result<MedalCatalog> {
        let mut overrides = Vec::with_capacity(self.thresholds.len());
        for (name, thresholds) in &self.thresholds {
            let category: MedalCategory = name.parse().map_err(|_| {
                Error::Config(format!(
                    "unknown achievement category '{}' (known: {})",
                    name,
                    MedalCategory::known_names().join(", ")
                ))
            })?;
            overrides.push((category, thresholds.clone()));
        }
        Ok(MedalCatalog::with_overrides(&overrides))
    }
}

impl Config {
    /// Returns the config directory path
    pub fn config_dir() -> PathBuf {
        xdg_config_home().join("highscore")
    }

    /// Returns the config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Returns the state directory path (for logs)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("highscore")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("highscore.log")
    }

    /// Load configuration from the default path.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("invalid config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.achievements.thresholds.is_empty());
        let catalog = config.achievements.medal_catalog().unwrap();
        assert!(catalog.total_medals() > 0);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml_str(
            r#"
            [logging]
            level = "debug"

            [achievements.thresholds]
            sessions = [5.0, 25.0]
            streak = [2.0]
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, "debug");

        let catalog = config.achievements.medal_catalog().unwrap();
        assert_eq!(catalog.thresholds(MedalCategory::Sessions), vec![5.0, 25.0]);
        assert_eq!(catalog.thresholds(MedalCategory::Streak), vec![2.0]);
        // Untouched category keeps defaults
        assert_eq!(catalog.thresholds(MedalCategory::Speed), vec![10.0, 25.0]);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let config = Config::from_toml_str(
            r#"
            [achievements.thresholds]
            no_such_category = [1.0]
            "#,
        )
        .unwrap();
        assert!(config.achievements.medal_catalog().is_err());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(Config::from_toml_str("logging = ").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"warn\"").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_paths() {
        assert!(Config::config_path().ends_with("highscore/config.toml"));
        assert!(Config::log_path().ends_with("highscore/highscore.log"));
    }
}
