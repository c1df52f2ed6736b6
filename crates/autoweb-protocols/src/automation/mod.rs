//! Browser automation protocol definitions.
//!
//! The engine never talks to a browser directly. It drives an
//! [`AutomationPage`] handed out by an [`AutomationBrowser`], which owns the
//! single shared connection.

mod target;
mod traits;

pub use target::*;
pub use traits::*;
