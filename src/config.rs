//! Configuration management for scopelog
//!
//! [`LogConfig`] is the process-wide logging configuration (log directory and
//! minimum severity). [`Settings`] is the on-disk TOML file the binary reads
//! it from.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::severity::Severity;

/// Logging configuration shared by every gate and scoped logger
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Directory that holds the `<name>.log-YYMMDD` files
    pub log_dir: PathBuf,
    /// Most verbose severity that is still written
    pub min_severity: Severity,
}

impl LogConfig {
    /// Create a config from a directory and a severity name
    ///
    /// The name is matched case-insensitively against ERROR, INFO and DEBUG.
    /// Anything else selects Error-only logging.
    pub fn new(log_dir: impl Into<PathBuf>, level: &str) -> Self {
        if level.parse::<Severity>().is_err() {
            tracing::warn!(level, "Unknown log level, only errors will be logged");
        }
        Self {
            log_dir: log_dir.into(),
            min_severity: Severity::from_name(level),
        }
    }

    /// Create the log directory if it is missing
    pub fn ensure_log_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("Failed to create log directory {}", self.log_dir.display()))
    }
}

/// Settings file for the scopelog binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log directory; a leading `~` is expanded to the home directory
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Minimum severity name: "ERROR", "INFO" (default) or "DEBUG"
    #[serde(default = "default_level")]
    pub level: String,

    /// Port for the demo HTTP server
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

fn default_log_dir() -> String {
    config_dir().join("logs").to_string_lossy().into_owned()
}

fn default_level() -> String {
    "INFO".to_string()
}

fn default_listen_port() -> u16 {
    8080
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            level: default_level(),
            listen_port: default_listen_port(),
        }
    }
}

impl Settings {
    /// Load settings from the default location, or return defaults if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load settings from `path`, or return defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).context("Failed to read settings file")?;
            toml::from_str(&content).context("Failed to parse settings file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content).context("Failed to write settings file")?;
        Ok(())
    }

    /// Log directory with `~` expanded
    pub fn expanded_log_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_dir).into_owned())
    }

    /// Build the logging configuration described by these settings
    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(self.expanded_log_dir(), &self.level)
    }
}

/// Get the base configuration directory (~/.scopelog)
/// Falls back to ./.scopelog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".scopelog")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".scopelog"))
}

/// Get the path to the settings file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
