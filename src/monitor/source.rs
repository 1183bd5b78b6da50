//! Incremental reader for an append-only line source
//!
//! Only complete (newline-terminated) lines are delivered; a trailing
//! fragment the writer has not finished is picked up on a later poll.
//! Bytes are decoded lossily so stray non-UTF-8 never aborts a cycle.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, NaiveDateTime};
use privlight_core::{Cursor, Error, Result, SourceMode};
use tracing::{debug, warn};

/// Lines appended since the previous cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadBatch {
    pub lines: Vec<String>,
    pub cursor: Cursor,
    /// The source shrank and the cursor was reset to its start.
    pub rotated: bool,
    /// Lines excluded because their timestamp did not parse.
    pub malformed: usize,
}

#[derive(Debug, Clone)]
pub struct LineSource {
    path: PathBuf,
    mode: SourceMode,
    reference_time: Option<NaiveDateTime>,
}

impl LineSource {
    pub fn new(path: impl Into<PathBuf>, mode: SourceMode) -> Self {
        Self {
            path: path.into(),
            mode,
            reference_time: None,
        }
    }

    /// Pin "now" for year inference on syslog timestamps.
    pub fn with_reference_time(mut self, now: NaiveDateTime) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    fn now(&self) -> NaiveDateTime {
        self.reference_time
            .unwrap_or_else(|| Local::now().naive_local())
    }

    async fn read_complete_lines(&self) -> Result<Vec<String>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::source_unavailable(&self.path, e))?;
        Ok(complete_lines(&String::from_utf8_lossy(&bytes)))
    }

    /// Cursor at the current end of the source. Content already present at
    /// startup is never replayed.
    pub async fn baseline(&self) -> Result<Cursor> {
        let lines = self.read_complete_lines().await?;
        let cursor = match self.mode {
            SourceMode::History => Cursor::Lines(lines.len()),
            SourceMode::Log => {
                let now = self.now();
                Cursor::Timestamp(
                    lines
                        .iter()
                        .rev()
                        .find_map(|l| parse_syslog_timestamp(l, now)),
                )
            }
        };
        debug!("Baseline for {} is {}", self.path.display(), cursor);
        Ok(cursor)
    }

    /// Lines appended after `cursor`, plus the cursor to use next time.
    pub async fn read_new(&self, cursor: &Cursor) -> Result<ReadBatch> {
        let lines = self.read_complete_lines().await?;
        Ok(match cursor {
            Cursor::Lines(consumed) => self.after_count(lines, *consumed),
            Cursor::Timestamp(last) => after_timestamp(lines, *last, self.now()),
        })
    }

    fn after_count(&self, lines: Vec<String>, consumed: usize) -> ReadBatch {
        let total = lines.len();
        if total < consumed {
            let err = Error::RotatedOrTruncatedSource {
                path: self.path.clone(),
                previous: consumed,
                current: total,
            };
            warn!("{}; resetting cursor to start", err);
            return ReadBatch {
                lines,
                cursor: Cursor::Lines(total),
                rotated: true,
                malformed: 0,
            };
        }
        ReadBatch {
            lines: lines.into_iter().skip(consumed).collect(),
            cursor: Cursor::Lines(total),
            rotated: false,
            malformed: 0,
        }
    }
}

fn after_timestamp(
    lines: Vec<String>,
    last: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> ReadBatch {
    let stamped: Vec<(String, Option<NaiveDateTime>)> = lines
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let ts = parse_syslog_timestamp(&l, now);
            (l, ts)
        })
        .collect();

    // Unparsable lines at or before the last already-consumed stamp were
    // reported by an earlier poll.
    let consumed_upto = last.and_then(|l| {
        stamped
            .iter()
            .rposition(|(_, ts)| ts.is_some_and(|t| t <= l))
    });

    let mut next = last;
    let mut fresh = Vec::new();
    let mut malformed = 0;

    for (i, (line, ts)) in stamped.into_iter().enumerate() {
        let Some(ts) = ts else {
            if consumed_upto.map_or(true, |p| i > p) {
                debug!("{}", Error::malformed_line(line.as_str(), "unparsable timestamp"));
                malformed += 1;
            }
            continue;
        };
        if last.map_or(true, |l| ts > l) {
            fresh.push(line);
        }
        next = next.max(Some(ts));
    }

    ReadBatch {
        lines: fresh,
        cursor: Cursor::Timestamp(next),
        rotated: false,
        malformed,
    }
}

/// Split on newlines, dropping an unterminated trailing fragment.
pub fn complete_lines(text: &str) -> Vec<String> {
    let body = match text.rfind('\n') {
        Some(end) => &text[..=end],
        None => "",
    };
    body.lines().map(str::to_string).collect()
}

/// Leading timestamp of an auth-log line.
///
/// Accepts classic syslog (`Jan  5 10:00:00 host ...`, no year) and
/// RFC 3339 (`2026-01-05T10:00:00.123+00:00 host ...`). Classic stamps take
/// the year from `now`, stepping back one year when that would put the line
/// more than a day in the future (December lines read in January).
pub fn parse_syslog_timestamp(line: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let mut fields = line.split_whitespace();
    let first = fields.next()?;

    if first.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        return DateTime::parse_from_rfc3339(first)
            .ok()
            .map(|dt| dt.naive_local());
    }

    let day = fields.next()?;
    let time = fields.next()?;
    if day.is_empty() || day.len() > 2 {
        return None;
    }
    let in_year = |year: i32| {
        let stamp = format!("{} {} {:0>2} {}", year, first, day, time);
        NaiveDateTime::parse_from_str(&stamp, "%Y %b %d %H:%M:%S").ok()
    };
    match in_year(now.year()) {
        Some(ts) if ts - now <= chrono::Duration::days(1) => Some(ts),
        // Feb 29 has no counterpart in a common year; keep the current one.
        Some(ts) => Some(in_year(now.year() - 1).unwrap_or(ts)),
        None => in_year(now.year() - 1),
    }
}
