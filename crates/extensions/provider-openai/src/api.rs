//! OpenAI API types.

use serde::{Deserialize, Serialize};

/// OpenAI API request.
#[derive(Debug, Serialize)]
pub struct ApiRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

/// API message format.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

/// API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<ApiUsage>,
}

/// Response choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

/// Response message.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

/// API usage statistics.
#[derive(Debug, Deserialize)]
pub struct ApiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_skips_empty_fields() {
        let req = ApiRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            max_tokens: None,
            temperature: None,
            stop: Vec::new(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn test_response_with_null_content() {
        let json = r#"{"id":"x","model":"gpt-4o","choices":[{"message":{"role":"assistant","content":null},"finish_reason":"stop"}]}"#;
        let resp: ApiResponse = serde_json::from_str(json).unwrap();
        assert!(resp.choices[0].message.content.is_none());
        assert!(resp.usage.is_none());
    }

    #[test]
    fn test_error_body() {
        let json = r#"{"error": {"message": "Invalid API key", "type": "invalid_request_error"}}"#;
        let body: ApiErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.message, "Invalid API key");
    }
}
