//! Integration tests for the OpenAI provider against a mock server.

use insurspeak_llm::{CompletionProvider, CompletionRequest, LlmError, OpenAIProvider};
use pretty_assertions::assert_eq;
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> OpenAIProvider {
    OpenAIProvider::new()
        .with_api_key("sk-test")
        .with_base_url(format!("{}/v1", server.uri()))
}

#[tokio::test]
async fn test_complete_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(bearer_token("sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "max_tokens": 300
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "gpt-4o",
            "choices": [
                { "message": { "role": "assistant", "content": "A copay is a fixed fee." } }
            ],
            "usage": { "prompt_tokens": 12, "completion_tokens": 6, "total_tokens": 18 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider_for(&server)
        .complete(CompletionRequest::new("What is a copay?").with_system("expert"))
        .await
        .unwrap();

    assert_eq!(response.text, "A copay is a fixed fee.");
    assert_eq!(response.model, "gpt-4o");
    assert_eq!(response.tokens_used, Some(18));
}

#[tokio::test]
async fn test_non_success_status_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(CompletionRequest::new("hello"))
        .await
        .unwrap_err();

    match err {
        LlmError::ApiRequest { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("expected ApiRequest, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(CompletionRequest::new("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::RateLimited { retry_after_secs: 7 }));
}

#[tokio::test]
async fn test_empty_choices_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "gpt-4o",
            "choices": []
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(CompletionRequest::new("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::EmptyResponse(_)));
}

#[tokio::test]
async fn test_missing_key_fails_without_network() {
    let err = OpenAIProvider::new()
        .without_api_key()
        .with_base_url("http://127.0.0.1:1")
        .complete(CompletionRequest::new("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::ProviderNotConfigured));
}
