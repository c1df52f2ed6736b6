//! Anthropic LLM provider for AutoWeb.

mod api;
mod converter;
mod models;
mod parser;
mod provider;

pub use provider::AnthropicProvider;
