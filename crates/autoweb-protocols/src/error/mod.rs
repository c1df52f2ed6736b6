//! Error types for the AutoWeb protocol layer.

mod automation;
mod progress;
mod provider;

pub use automation::*;
pub use progress::*;
pub use provider::*;
