use super::*;

#[test]
fn test_completion_request_new() {
    let messages = vec![Message::user("Hello")];
    let request = CompletionRequest::new("gpt-4o", messages);

    assert_eq!(request.model, "gpt-4o");
    assert_eq!(request.messages.len(), 1);
    assert!(request.system.is_none());
    assert!(request.max_tokens.is_none());
    assert!(request.stop.is_empty());
}

#[test]
fn test_completion_request_builders() {
    let request = CompletionRequest::new("claude-sonnet-4-20250514", vec![])
        .with_system("You are a browser automation planner")
        .with_max_tokens(4096)
        .with_temperature(0.2);

    assert_eq!(request.system.as_deref(), Some("You are a browser automation planner"));
    assert_eq!(request.max_tokens, Some(4096));
    assert_eq!(request.temperature, Some(0.2));
}

#[test]
fn test_completion_request_skips_empty_options() {
    let request = CompletionRequest::new("m", vec![Message::user("x")]);
    let json = serde_json::to_string(&request).unwrap();
    assert!(!json.contains("system"));
    assert!(!json.contains("max_tokens"));
}
