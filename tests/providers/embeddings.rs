use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scribetwin::llm::{EmbeddingProvider, GeminiEmbedding, OpenAiEmbedding};

use super::harness::install_crypto;

#[tokio::test]
async fn gemini_embedder_batches_into_single_http_request() {
    install_crypto();
    let server = MockServer::start().await;

    let expected_body = json!({
        "requests": [
            {"model": "models/text-embedding-004", "content": {"parts": [{"text": "hello"}]}},
            {"model": "models/text-embedding-004", "content": {"parts": [{"text": "world"}]}}
        ]
    });
    let response_body = json!({
        "embeddings": [
            {"values": [0.1, 0.2, 0.3]},
            {"values": [0.4, 0.5, 0.6]}
        ]
    });

    Mock::given(method("POST"))
        .and(path("/models/text-embedding-004:batchEmbedContents"))
        .and(query_param("key", "test-key"))
        .and(body_json(expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
        .expect(1)
        .mount(&server)
        .await;

    let embedder =
        GeminiEmbedding::with_base_url(Some("test-key"), &server.uri(), "text-embedding-004", 3);
    let vectors = embedder.embed(&["hello", "world"]).await.unwrap();

    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0], vec![0.1_f32, 0.2_f32, 0.3_f32]);
    assert_eq!(vectors[1], vec![0.4_f32, 0.5_f32, 0.6_f32]);
    server.verify().await;
}

#[tokio::test]
async fn gemini_embedder_rejects_short_responses() {
    install_crypto();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/text-embedding-004:batchEmbedContents"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embeddings": [{"values": [0.1]}]})),
        )
        .mount(&server)
        .await;

    let embedder =
        GeminiEmbedding::with_base_url(Some("test-key"), &server.uri(), "text-embedding-004", 1);
    let err = embedder.embed(&["one", "two"]).await.unwrap_err();

    assert!(err.to_string().contains("expected 2 vectors"));
}

#[tokio::test]
async fn openai_embedder_batches_into_single_http_request() {
    install_crypto();
    let server = MockServer::start().await;

    let model = "text-embedding-3-small";
    let inputs = ["hello", "world"];

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({"model": model, "input": inputs})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "model": model,
            "data": [
                {"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]},
                {"object": "embedding", "index": 1, "embedding": [0.4, 0.5, 0.6]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedding::new(&server.uri(), "test-key", model, 3);
    let vectors = embedder.embed(&inputs).await.unwrap();

    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[1], vec![0.4_f32, 0.5_f32, 0.6_f32]);
    server.verify().await;
}
