//! OpenAI LLM provider for AutoWeb.
//!
//! Speaks the `/chat/completions` wire format, so any OpenAI-compatible
//! endpoint works through [`OpenAIProvider::with_url`].

mod api;
mod converter;
mod models;
mod provider;

pub use provider::OpenAIProvider;
