//! Provider adapter tests
//!
//! Exercise the OpenAI and Anthropic wire formats against a mock server

use httpmock::prelude::*;
use promptlift::providers::{
    AnthropicProvider, GenerationParams, InvocationError, OpenAIProvider, RetryConfig,
    RetryingGenerator, TextGenerator,
};
use serde_json::json;
use std::sync::Arc;

const TEST_KEY: &str = "sk-test-provider-1234";

fn params() -> GenerationParams {
    GenerationParams {
        temperature: 0.3,
        max_tokens: 512,
    }
}

#[tokio::test]
async fn test_openai_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", format!("Bearer {}", TEST_KEY))
                .body_contains("\"model\":\"gpt-4o-mini\"")
                .body_contains("\"role\":\"system\"")
                .body_contains("rewrite this");
            then.status(200).json_body(json!({
                "id": "chatcmpl-123",
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "  raw reply text\n"},
                    "finish_reason": "stop"
                }]
            }));
        })
        .await;

    let provider = OpenAIProvider::new(server.base_url(), Some(TEST_KEY.to_string()), "gpt-4o-mini", 5).unwrap();
    let reply = provider.generate("instruction", "rewrite this", &params()).await.unwrap();

    // Returned verbatim, trimming is the parser's job
    assert_eq!(reply, "  raw reply text\n");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(401).json_body(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}
            }));
        })
        .await;

    let provider = OpenAIProvider::new(server.base_url(), Some(TEST_KEY.to_string()), "gpt-4o-mini", 5).unwrap();
    match provider.generate("s", "u", &params()).await {
        Err(InvocationError::ProviderFailure { provider, status, message }) => {
            assert_eq!(provider, "openai");
            assert_eq!(status, Some(401));
            assert!(message.contains("Incorrect API key provided"));
        }
        other => panic!("expected provider failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_openai_malformed_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).header("content-type", "application/json").body("{not json");
        })
        .await;

    let provider = OpenAIProvider::new(server.base_url(), Some(TEST_KEY.to_string()), "gpt-4o-mini", 5).unwrap();
    let error = provider.generate("s", "u", &params()).await.unwrap_err();
    assert!(matches!(error, InvocationError::ProviderFailure { status: Some(200), .. }));
}

#[tokio::test]
async fn test_openai_empty_choices() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({"choices": []}));
        })
        .await;

    let provider = OpenAIProvider::new(server.base_url(), Some(TEST_KEY.to_string()), "gpt-4o-mini", 5).unwrap();
    assert!(provider.generate("s", "u", &params()).await.is_err());
}

#[tokio::test]
async fn test_missing_credential_makes_no_call() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200);
        })
        .await;

    let openai = OpenAIProvider::new(server.base_url(), None, "gpt-4o-mini", 5).unwrap();
    let anthropic = AnthropicProvider::new(server.base_url(), Some(String::new()), "claude", 5).unwrap();

    assert_eq!(openai.generate("s", "u", &params()).await, Err(InvocationError::NoCredential));
    assert_eq!(anthropic.generate("s", "u", &params()).await, Err(InvocationError::NoCredential));
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_anthropic_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/messages")
                .header("x-api-key", TEST_KEY)
                .header("anthropic-version", "2023-06-01")
                .body_contains("\"system\":\"instruction\"")
                .body_contains("\"max_tokens\":512");
            then.status(200).json_body(json!({
                "id": "msg_123",
                "type": "message",
                "role": "assistant",
                "model": "claude-3-5-haiku-latest",
                "content": [
                    {"type": "thinking", "thinking": "..."},
                    {"type": "text", "text": "OPTIMIZED_PROMPT:\nHello"}
                ],
                "stop_reason": "end_turn"
            }));
        })
        .await;

    let provider = AnthropicProvider::new(
        server.base_url(),
        Some(TEST_KEY.to_string()),
        "claude-3-5-haiku-latest",
        5,
    )
    .unwrap();
    let reply = provider.generate("instruction", "prompt", &params()).await.unwrap();

    assert_eq!(reply, "OPTIMIZED_PROMPT:\nHello");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_anthropic_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/messages");
            then.status(529).json_body(json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            }));
        })
        .await;

    let provider = AnthropicProvider::new(server.base_url(), Some(TEST_KEY.to_string()), "claude", 5).unwrap();
    let error = provider.generate("s", "u", &params()).await.unwrap_err();
    assert!(error.is_retryable());
    assert!(error.to_string().contains("overloaded_error"));
}

#[tokio::test]
async fn test_retrying_generator_against_server() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(503).body("unavailable");
        })
        .await;

    let provider = OpenAIProvider::new(server.base_url(), Some(TEST_KEY.to_string()), "gpt-4o-mini", 5).unwrap();
    let generator = RetryingGenerator::new(
        Arc::new(provider),
        RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
    );

    assert!(generator.generate("s", "u", &params()).await.is_err());
    mock.assert_hits_async(3).await;
}
