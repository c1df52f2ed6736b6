//! Message conversion utilities.

use autoweb_protocols::types::{Message, MessageRole};

use crate::api::ApiMessage;

/// Convert messages to Anthropic API format.
///
/// System messages travel in the request's `system` field, so they are
/// dropped here. Consecutive turns of the same role are merged because the
/// API requires alternation.
pub fn convert_messages(messages: &[Message]) -> Vec<ApiMessage> {
    let mut out: Vec<ApiMessage> = Vec::with_capacity(messages.len());
    for message in messages.iter().filter(|m| m.role != MessageRole::System) {
        let role = match message.role {
            MessageRole::Assistant => "assistant",
            _ => "user",
        };
        match out.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => out.push(ApiMessage {
                role: role.to_string(),
                content: message.content.clone(),
            }),
        }
    }
    out
}

/// Collect system text from the request field and any inline system messages.
pub fn collect_system(system: Option<&str>, messages: &[Message]) -> Option<String> {
    let parts: Vec<&str> = system
        .into_iter()
        .chain(
            messages
                .iter()
                .filter(|m| m.role == MessageRole::System)
                .map(|m| m.content.as_str()),
        )
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() { None } else { Some(parts.join("\n\n")) }
}
