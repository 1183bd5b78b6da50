use privlight_core::{Event, EventKind, PrivilegeLevel};

/// Nested elevation as a LIFO of levels. The bottom entry is the session
/// baseline and is never popped, so depth is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeStack {
    levels: Vec<PrivilegeLevel>,
}

impl PrivilegeStack {
    pub fn new() -> Self {
        Self {
            levels: vec![PrivilegeLevel::User],
        }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn top(&self) -> PrivilegeLevel {
        self.levels
            .last()
            .copied()
            .unwrap_or(PrivilegeLevel::User)
    }

    pub fn is_elevated(&self) -> bool {
        self.depth() > 1
    }

    pub fn push(&mut self, level: PrivilegeLevel) {
        self.levels.push(level);
    }

    /// Pop one level. At baseline this is a no-op returning `None`: a
    /// de-escalation can be seen without its escalation when the monitor
    /// starts mid-session.
    pub fn pop(&mut self) -> Option<PrivilegeLevel> {
        if self.is_elevated() {
            self.levels.pop()
        } else {
            None
        }
    }

    pub fn apply(&mut self, event: &Event) {
        match event.kind {
            EventKind::Escalate => self.push(PrivilegeLevel::Root),
            EventKind::DeEscalate => {
                self.pop();
            }
            EventKind::Ignore => {}
        }
    }

    /// Fold events in source order. Returns `(depth_before, depth_after)`.
    /// There is no rollback: whatever was applied stays applied.
    pub fn fold<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) -> (usize, usize) {
        let before = self.depth();
        for event in events {
            self.apply(event);
        }
        (before, self.depth())
    }
}

impl Default for PrivilegeStack {
    fn default() -> Self {
        Self::new()
    }
}
