//! # AutoWeb Engine
//!
//! Turns a natural-language task and an entry page into a plan, generates a
//! script per plan step, and executes those scripts against the shared
//! browser page with timeout escalation and model-driven repair.
//!
//! ## Flow
//!
//! ```text
//! page content ─► plan text ─► steps ─► per-step code ─► execution ─► result
//!     capture        plan        plan       codegen        executor     normalize
//!                                                          └─ repair ─┘
//! ```
//!
//! Entry point is [`AutomationEngine::handle`], which dispatches one
//! [`AutomationRequest`] and always returns an [`AutomationResponse`].

pub mod capture;
pub mod codegen;
pub mod engine;
pub mod error;
pub mod executor;
pub mod frames;
pub mod models;
pub mod narrator;
pub mod normalize;
pub mod plan;
pub mod registry;
pub mod repair;
pub mod script;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::AutomationEngine;
pub use error::EngineError;
pub use models::{ModelHandle, ModelRouter};
pub use registry::{SessionRegistry, SessionSlot, SessionSummary};
pub use script::{JsScriptRuntime, ScriptFragment, ScriptOutcome, ScriptRuntime};
pub use session::{PlanStep, RunSession};
pub use types::{Action, AutomationRequest, AutomationResponse, ExecutionStep, StepResult};
