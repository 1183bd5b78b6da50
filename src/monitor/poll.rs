//! The poll loop: read → classify → fold → resolve → actuate

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use privlight_core::{Action, Actuator, Cursor, EventKind, Result};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::extract::Classifier;
use super::source::LineSource;
use super::stack::PrivilegeStack;
use super::status;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interval: Duration,
    /// Emit a JSON status line on stdout after every cycle.
    pub json_stdout: bool,
    /// Show the baseline colour once at startup.
    pub indicate_on_start: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            json_stdout: false,
            indicate_on_start: true,
        }
    }
}

/// Outcome of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub lines: usize,
    pub escalations: usize,
    pub deescalations: usize,
    pub malformed: usize,
    pub rotated: bool,
    pub depth_before: usize,
    pub depth_after: usize,
    pub action: Action,
    /// Whether the actuator accepted the action. `None` when nothing was sent.
    pub actuated: Option<bool>,
    pub cursor: Cursor,
}

/// Owns the cursor and the privilege stack for the lifetime of the loop.
pub struct Monitor {
    source: LineSource,
    classifier: Classifier,
    actuator: Box<dyn Actuator>,
    config: MonitorConfig,
    stack: PrivilegeStack,
    cursor: Cursor,
    reference_time: Option<NaiveDateTime>,
}

impl Monitor {
    /// Establish the baseline cursor. Fails with `SourceUnavailable` when the
    /// source cannot be read, which is fatal for startup.
    pub async fn start(
        source: LineSource,
        classifier: Classifier,
        actuator: Box<dyn Actuator>,
        config: MonitorConfig,
    ) -> Result<Self> {
        let cursor = source.baseline().await?;
        info!(
            "Watching {} ({} mode) from {}",
            source.path().display(),
            source.mode(),
            cursor
        );
        Ok(Self::with_cursor(source, classifier, actuator, config, cursor))
    }

    /// Start from an explicit cursor instead of the source's current end.
    pub fn with_cursor(
        source: LineSource,
        classifier: Classifier,
        actuator: Box<dyn Actuator>,
        config: MonitorConfig,
        cursor: Cursor,
    ) -> Self {
        Self {
            source,
            classifier,
            actuator,
            config,
            stack: PrivilegeStack::new(),
            cursor,
            reference_time: None,
        }
    }

    /// Pin "now" for syslog year inference during classification.
    pub fn with_reference_time(mut self, now: NaiveDateTime) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn stack(&self) -> &PrivilegeStack {
        &self.stack
    }

    /// One full cycle. Read failures are returned and leave the cursor and
    /// stack untouched; actuator failures are logged and reported.
    pub async fn poll_once(&mut self) -> Result<CycleReport> {
        let batch = self.source.read_new(&self.cursor).await?;
        if batch.malformed > 0 {
            warn!("Skipped {} malformed lines in {}", batch.malformed, self.source.path().display());
        }

        let now = self
            .reference_time
            .unwrap_or_else(|| Local::now().naive_local());
        let events = self.classifier.classify_all(&batch.lines, now);
        let escalations = events.iter().filter(|e| e.kind == EventKind::Escalate).count();
        let deescalations = events.iter().filter(|e| e.kind == EventKind::DeEscalate).count();
        if escalations + deescalations > 0 {
            debug!(
                "Found {} privilege change lines ({} up, {} down)",
                escalations + deescalations,
                escalations,
                deescalations
            );
        }

        let (depth_before, depth_after) = self.stack.fold(&events);
        self.cursor = batch.cursor;

        let action = Action::resolve(depth_before, depth_after);
        let actuated = if action.is_change() {
            info!(
                "Privilege {} (depth {} -> {})",
                action, depth_before, depth_after
            );
            Some(self.actuate(action).await)
        } else {
            debug!("No privilege change detected.");
            None
        };

        Ok(CycleReport {
            lines: batch.lines.len(),
            escalations,
            deescalations,
            malformed: batch.malformed,
            rotated: batch.rotated,
            depth_before,
            depth_after,
            action,
            actuated,
            cursor: self.cursor.clone(),
        })
    }

    async fn actuate(&self, action: Action) -> bool {
        match self.actuator.apply(action).await {
            Ok(n) => {
                debug!("{} applied {} to {} devices", self.actuator.name(), action, n);
                true
            }
            Err(e) => {
                warn!("{} failed to apply {}: {}", self.actuator.name(), action, e);
                false
            }
        }
    }

    /// Poll until `cancel` fires. Cancellation is observed between cycles;
    /// a cycle in progress always runs to completion.
    pub async fn run(&mut self, cancel: CancellationToken) {
        if self.config.indicate_on_start {
            self.actuate(Action::DeEscalate).await;
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            match self.poll_once().await {
                Ok(report) => {
                    if self.config.json_stdout {
                        status::emit("poll_cycle", &report);
                    }
                }
                Err(e) if e.is_recoverable() => warn!("Poll cycle degraded: {}", e),
                Err(e) => error!("Poll cycle skipped: {}", e),
            }
        }

        info!("Monitor stopped at {} (depth {})", self.cursor, self.stack.depth());
    }
}
