//! LLM Provider protocol definitions.
//!
//! Providers connect to chat-completion APIs (OpenAI, Anthropic) and turn a
//! prompt into text. Plan and code generation only need text out.

mod model;
mod request;
mod response;
mod traits;

pub use model::*;
pub use request::*;
pub use response::*;
pub use traits::*;
