//! Message conversion for the OpenAI API.

use autoweb_protocols::provider::CompletionRequest;
use autoweb_protocols::types::{Message, MessageRole};

use crate::api::ApiMessage;

/// Convert protocol messages to OpenAI API format.
///
/// The separate system prompt becomes the leading `system` message.
pub fn convert_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
    let mut out = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = request.system.as_deref().filter(|s| !s.is_empty()) {
        out.push(ApiMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
    }
    out.extend(request.messages.iter().map(convert_message));
    out
}

fn convert_message(msg: &Message) -> ApiMessage {
    let role = match msg.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    };
    ApiMessage {
        role: role.to_string(),
        content: msg.content.clone(),
    }
}
