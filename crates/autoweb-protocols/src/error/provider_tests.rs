use super::*;

#[test]
fn test_provider_error_not_found() {
    let err = ProviderError::NotFound("test_provider".to_string());
    assert!(err.to_string().contains("Provider not found"));
}

#[test]
fn test_provider_error_api_error() {
    let err = ProviderError::ApiError {
        status: 500,
        message: "Internal Server Error".to_string(),
    };
    assert!(err.to_string().contains("500"));
    assert!(err.to_string().contains("Internal Server Error"));
}

#[test]
fn test_provider_error_rate_limited() {
    let err = ProviderError::RateLimited {
        retry_after_seconds: 60,
    };
    assert!(err.to_string().contains("Rate limited"));
    assert!(err.to_string().contains("60"));
}

#[test]
fn test_provider_error_timeout() {
    let err = ProviderError::Timeout(30);
    assert!(err.to_string().contains("Timeout"));
    assert!(err.to_string().contains("30"));
}

#[test]
fn test_from_api_response_auth() {
    let err = ProviderError::from_api_response(401, "bad key".to_string());
    assert!(matches!(err, ProviderError::AuthenticationFailed(ref m) if m == "bad key"));

    let err = ProviderError::from_api_response(403, "forbidden".to_string());
    assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
}

#[test]
fn test_from_api_response_rate_limit() {
    let err = ProviderError::from_api_response(429, "slow down".to_string());
    assert!(matches!(err, ProviderError::RateLimited { .. }));
}

#[test]
fn test_from_api_response_invalid_request() {
    let err = ProviderError::from_api_response(400, "missing model".to_string());
    assert!(matches!(err, ProviderError::InvalidRequest(_)));
}

#[test]
fn test_from_api_response_server_error() {
    let err = ProviderError::from_api_response(503, "overloaded".to_string());
    match err {
        ProviderError::ApiError { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("unexpected: {:?}", other),
    }
}
