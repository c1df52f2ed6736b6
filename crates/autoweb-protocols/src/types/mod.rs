//! Common types shared across protocols.

mod common;
mod message;

pub use common::*;
pub use message::*;
