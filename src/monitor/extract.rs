//! Line classification into privilege events

use chrono::{Local, NaiveDateTime};
use privlight_core::{Error, Event, EventKind, Result, SourceMode};
use tracing::debug;

use super::source::parse_syslog_timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classifier {
    /// Shell history: command prefixes, first match wins.
    History {
        escalate: Vec<String>,
        deescalate: Vec<String>,
    },
    /// Auth log: message substrings, first match wins.
    Log { escalate: String, deescalate: String },
}

impl Classifier {
    pub fn history(escalate: &[&str], deescalate: &[&str]) -> Self {
        Self::History {
            escalate: escalate.iter().map(|s| s.to_string()).collect(),
            deescalate: deescalate.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn log(escalate: impl Into<String>, deescalate: impl Into<String>) -> Self {
        Self::Log {
            escalate: escalate.into(),
            deescalate: deescalate.into(),
        }
    }

    pub fn mode(&self) -> SourceMode {
        match self {
            Self::History { .. } => SourceMode::History,
            Self::Log { .. } => SourceMode::Log,
        }
    }

    pub fn classify(&self, line: &str) -> Event {
        self.classify_at(line, Local::now().naive_local())
    }

    /// Classify with an explicit "now" for syslog year inference.
    pub fn classify_at(&self, line: &str, now: NaiveDateTime) -> Event {
        match self {
            Self::History {
                escalate,
                deescalate,
            } => match history_command(line) {
                Ok(command) => Event::new(match_prefix(command, escalate, deescalate)),
                Err(e) => {
                    debug!("{}", e);
                    Event::ignore()
                }
            },
            Self::Log {
                escalate,
                deescalate,
            } => {
                let kind = if line.contains(escalate.as_str()) {
                    EventKind::Escalate
                } else if line.contains(deescalate.as_str()) {
                    EventKind::DeEscalate
                } else {
                    EventKind::Ignore
                };
                Event::new(kind).with_timestamp(parse_syslog_timestamp(line, now))
            }
        }
    }

    /// Classify a batch, preserving source order.
    pub fn classify_all(&self, lines: &[String], now: NaiveDateTime) -> Vec<Event> {
        lines.iter().map(|l| self.classify_at(l, now)).collect()
    }
}

fn match_prefix(command: &str, escalate: &[String], deescalate: &[String]) -> EventKind {
    if escalate.iter().any(|p| command.starts_with(p.as_str())) {
        EventKind::Escalate
    } else if deescalate.iter().any(|p| command.starts_with(p.as_str())) {
        EventKind::DeEscalate
    } else {
        EventKind::Ignore
    }
}

/// The command text of a history line. zsh extended history entries look
/// like `: 1700000000:0;sudo -i` and are unwrapped to the part after `;`.
pub fn history_command(line: &str) -> Result<&str> {
    let line = line.trim();
    let Some(meta) = line.strip_prefix(": ") else {
        return Ok(line);
    };
    let Some((stamp, command)) = meta.split_once(';') else {
        return Err(Error::malformed_line(line, "extended history entry without command"));
    };
    let valid_stamp = stamp
        .split(':')
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    if !valid_stamp {
        return Err(Error::malformed_line(line, "bad extended history timestamp"));
    }
    Ok(command.trim_start())
}
