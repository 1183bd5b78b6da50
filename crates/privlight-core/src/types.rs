//! Core types for privlight

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which kind of line source is being watched.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Shell history file, one command per line.
    #[default]
    History,
    /// Syslog-style authentication log.
    Log,
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::History => write!(f, "history"),
            Self::Log => write!(f, "log"),
        }
    }
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "history" => Ok(Self::History),
            "log" => Ok(Self::Log),
            other => Err(format!("unknown source mode '{other}' (expected history or log)")),
        }
    }
}

/// Position in the line source up to which lines have been processed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum Cursor {
    /// Number of complete lines consumed.
    Lines(usize),
    /// Timestamp of the last processed line. `None` until one has been seen.
    Timestamp(Option<NaiveDateTime>),
}

impl Cursor {
    /// Starting cursor for a mode, before anything has been read.
    pub fn start(mode: SourceMode) -> Self {
        match mode {
            SourceMode::History => Self::Lines(0),
            SourceMode::Log => Self::Timestamp(None),
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lines(n) => write!(f, "line {n}"),
            Self::Timestamp(Some(ts)) => write!(f, "{}", ts.format("%b %d %H:%M:%S")),
            Self::Timestamp(None) => write!(f, "-"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Escalate,
    DeEscalate,
    Ignore,
}

/// A classified source line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    /// Log-mode timestamp; history lines carry none.
    pub at: Option<NaiveDateTime>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, at: None }
    }

    pub fn escalate() -> Self {
        Self::new(EventKind::Escalate)
    }

    pub fn deescalate() -> Self {
        Self::new(EventKind::DeEscalate)
    }

    pub fn ignore() -> Self {
        Self::new(EventKind::Ignore)
    }

    pub fn with_timestamp(mut self, at: Option<NaiveDateTime>) -> Self {
        self.at = at;
        self
    }
}

/// One level on the privilege stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivilegeLevel {
    User,
    Root,
}

/// What the indicator should do after a poll cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    None,
    Elevate,
    DeEscalate,
}

impl Action {
    /// Net change in stack depth across a batch. Depth growth means privilege
    /// was gained; shrinkage means it was relinquished.
    pub fn resolve(depth_before: usize, depth_after: usize) -> Self {
        match depth_after.cmp(&depth_before) {
            std::cmp::Ordering::Greater => Self::Elevate,
            std::cmp::Ordering::Less => Self::DeEscalate,
            std::cmp::Ordering::Equal => Self::None,
        }
    }

    pub fn is_change(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Elevate => write!(f, "elevate"),
            Self::DeEscalate => write!(f, "de-escalate"),
        }
    }
}

/// RGB colour triple. Serializes as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 153, 255);

    pub fn to_bytes(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Accepts `r,g,b` with decimal components.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(format!("expected r,g,b but got '{s}'"));
        };
        let channel = |c: &str| c.parse::<u8>().map_err(|e| format!("bad channel '{c}': {e}"));
        Ok(Rgb(channel(r)?, channel(g)?, channel(b)?))
    }
}
