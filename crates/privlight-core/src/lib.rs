//! privlight core - types, the actuator seam, and error handling

pub mod actuator;
pub mod error;
pub mod types;

pub use actuator::Actuator;
pub use error::{Error, Result};
pub use types::*;
