//! privlight configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file
//! exists. CLI flags override individual fields afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use privlight_core::{Error, Result, Rgb, SourceMode};
use privlight_fx::{DEFAULT_SYSFS_ROOT, STATIC_EFFECT};
use serde::{Deserialize, Serialize};

use crate::monitor::Classifier;

pub const DEFAULT_AUTH_LOG: &str = "/var/log/auth.log";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivlightConfig {
    /// Log file written alongside stderr. Defaults to `~/.privlight.log`.
    pub log_file: Option<PathBuf>,
    pub poll: PollConfig,
    pub source: SourceConfig,
    /// Prefixes for history mode.
    pub history: HistoryConfig,
    /// Markers for auth-log mode.
    pub log: LogConfig,
    pub colors: ColorConfig,
    pub devices: DeviceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub mode: SourceMode,
    /// Explicit source path. Unset means `$HISTFILE` / `~/.bash_history`
    /// in history mode and `/var/log/auth.log` in log mode.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub escalate: Vec<String>,
    pub deescalate: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub escalate_marker: String,
    pub deescalate_marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Shown while running elevated.
    pub elevated: Rgb,
    /// Shown at the session baseline.
    pub baseline: Rgb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub sysfs_root: PathBuf,
    pub effect: String,
}

// ============================================================
// Defaults
// ============================================================

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            escalate: vec!["sudo".into(), "su".into()],
            deescalate: vec!["exit".into(), "logout".into()],
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            escalate_marker: "Successful su".into(),
            deescalate_marker: "Removed session".into(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            elevated: Rgb::RED,
            baseline: Rgb::BLUE,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            effect: STATIC_EFFECT.into(),
        }
    }
}

// ============================================================
// Loading
// ============================================================

/// What happened when reading the config file. Kept separate from the
/// config so the outcome can be logged once tracing is installed.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded,
    Missing,
    Invalid(Error),
}

impl LoadOutcome {
    pub fn message(&self, path: &Path) -> String {
        match self {
            Self::Loaded => format!("Loaded config from {}", path.display()),
            Self::Missing => format!("No config at {}, using defaults", path.display()),
            Self::Invalid(e) => format!("Failed to parse {}: {}, using defaults", path.display(), e),
        }
    }

    pub fn log(&self, path: &Path) {
        match self {
            Self::Invalid(_) => tracing::warn!("{}", self.message(path)),
            _ => tracing::info!("{}", self.message(path)),
        }
    }
}

impl PrivlightConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        let (config, outcome) = Self::load_with_outcome(path);
        outcome.log(path);
        config
    }

    /// Like `load`, but hands the outcome back instead of logging it.
    pub fn load_with_outcome(path: &Path) -> (Self, LoadOutcome) {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => (config, LoadOutcome::Loaded),
                Err(e) => (Self::default(), LoadOutcome::Invalid(e)),
            },
            Err(_) => (Self::default(), LoadOutcome::Missing),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// `~/.config/privlight/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("privlight").join("config.toml"))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.poll.interval_secs)
    }

    /// Source path for the configured mode.
    pub fn source_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.source.path {
            return Ok(path.clone());
        }
        match self.source.mode {
            SourceMode::Log => Ok(PathBuf::from(DEFAULT_AUTH_LOG)),
            SourceMode::History => std::env::var_os("HISTFILE")
                .map(PathBuf::from)
                .or_else(|| dirs::home_dir().map(|h| h.join(".bash_history")))
                .ok_or_else(|| {
                    Error::ConfigError("HISTFILE not set and no home directory".into())
                }),
        }
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join(".privlight.log")))
    }

    pub fn classifier(&self) -> Classifier {
        match self.source.mode {
            SourceMode::History => Classifier::History {
                escalate: self.history.escalate.clone(),
                deescalate: self.history.deescalate.clone(),
            },
            SourceMode::Log => Classifier::log(
                self.log.escalate_marker.clone(),
                self.log.deescalate_marker.clone(),
            ),
        }
    }

    /// Reject settings the monitor cannot run with, including a log file
    /// path (explicit or `~/.privlight.log`) that cannot be a file.
    pub fn validate(&self) -> Result<()> {
        self.validate_settings()?;
        match self.log_file_path() {
            Some(path) => check_log_file(&path),
            None => Ok(()),
        }
    }

    /// `validate` without the log file check, for `--no-log-file`.
    pub fn validate_settings(&self) -> Result<()> {
        if self.poll.interval_secs == 0 {
            return Err(Error::ConfigError("poll.interval_secs must be at least 1".into()));
        }
        match self.source.mode {
            SourceMode::History => {
                let blank = self
                    .history
                    .escalate
                    .iter()
                    .chain(&self.history.deescalate)
                    .any(|p| p.is_empty());
                if self.history.escalate.is_empty() || blank {
                    return Err(Error::ConfigError(
                        "history.escalate must be non-empty and prefixes may not be blank".into(),
                    ));
                }
            }
            SourceMode::Log => {
                if self.log.escalate_marker.is_empty() || self.log.deescalate_marker.is_empty() {
                    return Err(Error::ConfigError("log markers may not be blank".into()));
                }
            }
        }
        Ok(())
    }
}

pub fn check_log_file(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(Error::ConfigError(format!(
            "log file is a directory: {}",
            path.display()
        )));
    }
    Ok(())
}
