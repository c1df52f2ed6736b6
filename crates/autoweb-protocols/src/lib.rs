//! # AutoWeb Protocols
//!
//! Core protocol definitions (traits) for the AutoWeb engine.
//! Contains only interface definitions and the few trivial implementations
//! every binary needs (log and null progress sinks).
//!
//! ## Core Traits
//!
//! - [`LLMProvider`] - Chat-completion model backends
//! - [`AutomationPage`] - Page/frame capability surface over a live browser document
//! - [`AutomationBrowser`] - Owner of the lazily-connected shared browser
//! - [`ProgressSink`] - Advisory text channel for human-readable progress

pub mod automation;
pub mod error;
pub mod progress;
pub mod provider;
pub mod types;

pub use automation::{
    AriaNode, AutomationBrowser, AutomationPage, CaptureMode, ExecutionTarget, FrameInfo, js_string,
};
pub use error::{AutomationError, ProgressError, ProviderError};
pub use progress::{LogSink, NullSink, ProgressEvent, ProgressKind, ProgressSink};
pub use provider::{CompletionRequest, CompletionResponse, LLMProvider, ModelDefinition};
pub use types::*;
