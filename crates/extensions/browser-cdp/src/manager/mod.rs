//! Shared browser connection.
//!
//! Launches Chrome with a persistent profile when nothing is listening on the
//! debug port, connects once, and hands every run the same page.

mod manager_core;
mod manager_types;

pub use manager_core::BrowserManager;
pub use manager_types::{BrowserError, BrowserManagerConfig};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
