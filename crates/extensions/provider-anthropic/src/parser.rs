//! Response parsing utilities.

use autoweb_protocols::provider::CompletionResponse;
use autoweb_protocols::types::{StopReason, Usage};

use crate::api::{ApiResponse, ContentBlock};

/// Parse API response to CompletionResponse, concatenating text blocks.
pub fn parse_response(response: ApiResponse) -> CompletionResponse {
    let text: String = response
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
        .collect();

    CompletionResponse {
        id: response.id,
        model: response.model,
        text,
        stop_reason: response
            .stop_reason
            .as_deref()
            .map(StopReason::from_finish_reason)
            .unwrap_or(StopReason::EndTurn),
        usage: Usage {
            prompt_tokens: response.usage.input_tokens,
            completion_tokens: response.usage.output_tokens,
            total_tokens: response.usage.input_tokens + response.usage.output_tokens,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiUsage;

    #[test]
    fn test_parse_concatenates_text() {
        let response = ApiResponse {
            id: "msg_1".to_string(),
            model: "claude".to_string(),
            content: vec![
                ContentBlock::Text { text: "STEP 1:".to_string() },
                ContentBlock::Other,
                ContentBlock::Text { text: "\nDescription: x".to_string() },
            ],
            stop_reason: Some("max_tokens".to_string()),
            usage: ApiUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
        };
        let parsed = parse_response(response);
        assert_eq!(parsed.text, "STEP 1:\nDescription: x");
        assert_eq!(parsed.stop_reason, StopReason::MaxTokens);
        assert_eq!(parsed.usage.total_tokens, 30);
    }
}
