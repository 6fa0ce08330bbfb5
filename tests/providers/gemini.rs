use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scribetwin::LlmError;
use scribetwin::llm::{GeminiProvider, Provider, ReliableProvider, RetryPolicy};

use super::harness::install_crypto;

const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
    })
}

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        call_timeout: Duration::from_secs(5),
        max_retries,
        base_backoff_ms: 1,
        max_backoff_ms: 2,
    }
}

#[tokio::test]
async fn gemini_sends_system_instruction_and_returns_text() {
    install_crypto();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "be brief"}]},
            "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url(Some("test-key"), &server.uri());
    let text = provider
        .chat_with_system(Some("be brief"), "hello", "gemini-2.5-flash", 0.7)
        .await
        .unwrap();

    assert_eq!(text, "hi there");
    server.verify().await;
}

#[tokio::test]
async fn gemini_errors_do_not_leak_the_api_key() {
    install_crypto();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("API key not valid: key=AIzaSySecretValue"),
        )
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url(Some("AIzaSySecretValue"), &server.uri());
    let err = provider
        .chat_with_system(None, "hello", "gemini-2.5-flash", 0.7)
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("400"));
    assert!(!message.contains("AIzaSySecretValue"));
}

#[tokio::test]
async fn reliable_provider_retries_server_errors() {
    install_crypto();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("recovered")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ReliableProvider::new(
        Box::new(GeminiProvider::with_base_url(Some("test-key"), &server.uri())),
        fast_policy(2),
    );
    let text = provider
        .chat_with_system(None, "hello", "gemini-2.5-flash", 0.7)
        .await
        .unwrap();

    assert_eq!(text, "recovered");
    server.verify().await;
}

#[tokio::test]
async fn reliable_provider_gives_up_on_client_errors() {
    install_crypto();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ReliableProvider::new(
        Box::new(GeminiProvider::with_base_url(Some("test-key"), &server.uri())),
        fast_policy(3),
    );
    let err = provider
        .chat_with_system(None, "hello", "gemini-2.5-flash", 0.7)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LlmError>(),
        Some(LlmError::Request { .. })
    ));
    server.verify().await;
}

#[tokio::test]
async fn empty_candidates_surface_as_empty_response() {
    install_crypto();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"candidates": [{"finishReason": "SAFETY"}]})),
        )
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url(Some("test-key"), &server.uri());
    let err = provider
        .chat_with_system(None, "hello", "gemini-2.5-flash", 0.7)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LlmError>(),
        Some(LlmError::EmptyResponse { .. })
    ));
}
