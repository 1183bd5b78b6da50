//! Error types for privlight

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed line: {reason}")]
    MalformedLine { line: String, reason: String },

    #[error("source rotated or truncated: {} shrank from {previous} to {current} lines", path.display())]
    RotatedOrTruncatedSource {
        path: PathBuf,
        previous: usize,
        current: usize,
    },

    #[error("actuator failure: {device} - {message}")]
    ActuatorFailure { device: String, message: String },

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("toml error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn source_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_line(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line: line.into(),
            reason: reason.into(),
        }
    }

    pub fn actuator_failure(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ActuatorFailure {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Errors the poll loop logs and survives.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedLine { .. }
                | Self::RotatedOrTruncatedSource { .. }
                | Self::ActuatorFailure { .. }
        )
    }
}
