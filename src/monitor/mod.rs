//! Privilege-state tracking engine
//!
//! - `source`: incremental reads of the history file or auth log
//! - `extract`: line → Escalate / DeEscalate / Ignore
//! - `stack`: nested elevation as a LIFO of privilege levels
//! - `poll`: the cooperative loop driving the actuator
//!
//! Resolving a depth delta into an action is `Action::resolve` in
//! privlight-core.

pub mod extract;
pub mod poll;
pub mod source;
pub mod stack;
pub mod status;

pub use extract::Classifier;
pub use poll::{CycleReport, Monitor, MonitorConfig};
pub use source::{LineSource, ReadBatch};
pub use stack::PrivilegeStack;
