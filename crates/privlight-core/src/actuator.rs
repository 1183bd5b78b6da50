//! Actuator trait

use crate::error::Result;
use crate::types::Action;

/// Renders a resolved [`Action`] as a visible signal.
///
/// The poll loop only calls this when the privilege level actually changed
/// (or once at startup to show the baseline). Implementations own device
/// discovery and capability filtering.
#[async_trait::async_trait]
pub trait Actuator: Send + Sync {
    fn name(&self) -> &str;

    /// Apply the action. Returns the number of devices updated.
    async fn apply(&self, action: Action) -> Result<usize>;
}
