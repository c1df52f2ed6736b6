use super::*;
use autoweb_protocols::types::Message;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

fn request() -> CompletionRequest {
    CompletionRequest::new("claude-sonnet-4-20250514", vec![Message::user("Hello")])
        .with_system("You write browser scripts")
}

#[test]
fn test_provider_id() {
    let provider = AnthropicProvider::new("test-key".to_string());
    assert_eq!(provider.id(), "anthropic");
    assert_eq!(provider.api_url, API_URL);
}

#[test]
fn test_base_url_normalization() {
    let provider = AnthropicProvider::with_base_url("k".to_string(), "https://proxy.local/v1");
    assert_eq!(provider.api_url, "https://proxy.local/v1/messages");
}

#[test]
fn test_build_request_defaults_max_tokens() {
    let provider = AnthropicProvider::new("k".to_string());
    let api_request = provider.build_request(&request());
    assert_eq!(api_request.max_tokens, DEFAULT_MAX_TOKENS);
    assert_eq!(api_request.system.as_deref(), Some("You write browser scripts"));
    assert_eq!(api_request.messages.len(), 1);
}

#[tokio::test]
async fn test_complete_success() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-20250514",
        "content": [{"type": "text", "text": "// STEP 1\nautowebResult = 7;"}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 12, "output_tokens": 8}
    });

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/v1/messages"))
        .and(matchers::header("x-api-key", "test-key"))
        .and(matchers::header("anthropic-version", API_VERSION))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = AnthropicProvider::with_base_url(
        "test-key".to_string(),
        &format!("{}/v1", mock_server.uri()),
    );
    let response = provider.complete(request()).await.unwrap();
    assert!(response.text.contains("autowebResult = 7"));
    assert_eq!(response.usage.total_tokens, 20);
}

#[tokio::test]
async fn test_complete_auth_error() {
    let mock_server = MockServer::start().await;

    let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = AnthropicProvider::with_url("bad".to_string(), mock_server.uri());
    match provider.complete(request()).await.unwrap_err() {
        ProviderError::AuthenticationFailed(message) => assert_eq!(message, "invalid x-api-key"),
        other => panic!("Expected AuthenticationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_complete_overloaded() {
    let mock_server = MockServer::start().await;

    let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(529).set_body_string(body))
        .mount(&mock_server)
        .await;

    let provider = AnthropicProvider::with_url("k".to_string(), mock_server.uri());
    match provider.complete(request()).await.unwrap_err() {
        ProviderError::ApiError { status, message } => {
            assert_eq!(status, 529);
            assert_eq!(message, "Overloaded");
        }
        other => panic!("Expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_complete_bad_request() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let provider = AnthropicProvider::with_url("k".to_string(), mock_server.uri());
    match provider.complete(request()).await.unwrap_err() {
        ProviderError::InvalidRequest(message) => assert_eq!(message, "not json"),
        other => panic!("Expected InvalidRequest, got {:?}", other),
    }
}
