//! CDP page session for interacting with a single page.

mod accessibility;
mod core;
mod frames;
mod navigation;
mod runtime;

pub use accessibility::flatten_ax_tree;
pub use core::PageSession;
pub use frames::flatten_frame_tree;

#[cfg(test)]
mod tests;
