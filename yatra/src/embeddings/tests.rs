//! HTTP-level tests for the embedding client and provider.
//!
//! Tests cover:
//! 1. Request format and headers
//! 2. Rate limit (429) and server error (5xx) retries
//! 3. Auth (401/403) and other 4xx errors fail fast
//! 4. Count and dimension validation
//! 5. Sequential sub-batching in the provider

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::embeddings::api::{ApiConfig, EmbeddingApiClient};
use crate::embeddings::{EmbeddingProvider, RetryPolicy, TextEmbedder};
use crate::error::YatraError;

fn test_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        api_key: Some("test-api-key".to_string()),
        model: "cohere/embed-multilingual-v3.0".to_string(),
        timeout_secs: 10,
        retry: RetryPolicy::new(3, Duration::from_millis(5)),
        dimensions: None,
    }
}

fn embedding_response(embeddings: Vec<Vec<f32>>) -> serde_json::Value {
    json!({
        "data": embeddings.into_iter().map(|e| json!({ "embedding": e })).collect::<Vec<_>>()
    })
}

/// Answers with one 2-d vector per input, so batch sizes are observable.
fn echo_embeddings(request: &wiremock::Request) -> ResponseTemplate {
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    let inputs = body["input"].as_array().unwrap();
    let vectors = inputs
        .iter()
        .map(|input| vec![input.as_str().unwrap().len() as f32, 1.0])
        .collect();
    ResponseTemplate::new(200).set_body_json(embedding_response(vectors))
}

// =============================================================================
// Request format
// =============================================================================

#[tokio::test]
async fn test_api_client_request_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "model": "cohere/embed-multilingual-v3.0",
            "input": ["Kedarnath temple"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.1, 0.2, 0.3]])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    let embeddings = client.embed(&["Kedarnath temple"]).await.unwrap();

    assert_eq!(embeddings, vec![vec![0.1, 0.2, 0.3]]);
}

#[tokio::test]
async fn test_api_client_nested_gateway_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "data": [ { "vector": [0.5, 0.5] }, { "vector": [0.25, 0.75] } ] }
        })))
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    let embeddings = client.embed(&["a", "b"]).await.unwrap();

    assert_eq!(embeddings, vec![vec![0.5, 0.5], vec![0.25, 0.75]]);
}

// =============================================================================
// Retries
// =============================================================================

#[tokio::test]
async fn test_api_client_rate_limit_retry() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));

    // First two requests return 429, third succeeds
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&attempt_count);
            move |_: &wiremock::Request| {
                let attempt = count.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    ResponseTemplate::new(429)
                        .set_body_json(json!({ "error": "rate limited" }))
                        .insert_header("retry-after", "1")
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(embedding_response(vec![vec![0.1, 0.2, 0.3]]))
                }
            }
        })
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let result = client.embed(&["test"]).await;
    assert!(result.is_ok(), "Should succeed after retry");
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_api_client_rate_limit_exhausts_retries() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&attempt_count);
            move |_: &wiremock::Request| {
                count.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(429).set_body_json(json!({ "error": "rate limited" }))
            }
        })
        .mount(&mock_server)
        .await;

    let config = ApiConfig {
        retry: RetryPolicy::new(2, Duration::from_millis(5)),
        ..test_config(&mock_server.uri())
    };
    let client = EmbeddingApiClient::new(config).unwrap();
    let err = client.embed(&["test"]).await.unwrap_err();

    // 1 initial + 2 retries
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    assert!(matches!(err, YatraError::ApiRateLimit { .. }));
    assert!(err.to_string().contains("rate limit"));
}

#[tokio::test]
async fn test_api_client_server_error_retry_keeps_payload() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&attempt_count);
            move |_: &wiremock::Request| {
                count.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(503).set_body_string("upstream overloaded")
            }
        })
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    let err = client.embed(&["test"]).await.unwrap_err();

    assert_eq!(attempt_count.load(Ordering::SeqCst), 4);
    assert!(err.to_string().contains("upstream overloaded"), "{err}");
}

#[tokio::test]
async fn test_api_client_server_error_then_success() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&attempt_count);
            move |_: &wiremock::Request| {
                if count.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(embedding_response(vec![vec![1.0, 0.0]]))
                }
            }
        })
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    assert!(client.embed(&["test"]).await.is_ok());
    assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Fail-fast errors
// =============================================================================

#[tokio::test]
async fn test_api_client_auth_errors_no_retry() {
    for status in [401_u16, 403] {
        let mock_server = MockServer::start().await;
        let attempt_count = Arc::new(AtomicUsize::new(0));

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with({
                let count = Arc::clone(&attempt_count);
                move |_: &wiremock::Request| {
                    count.fetch_add(1, Ordering::SeqCst);
                    ResponseTemplate::new(status).set_body_json(json!({ "error": "invalid api key" }))
                }
            })
            .mount(&mock_server)
            .await;

        let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
        let err = client.embed(&["test"]).await.unwrap_err();

        assert_eq!(attempt_count.load(Ordering::SeqCst), 1, "status {status}");
        assert!(matches!(err, YatraError::ApiAuth(_)), "status {status}");
    }
}

#[tokio::test]
async fn test_api_client_400_error_no_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(400).set_body_string("input too long"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    let err = client.embed(&["test"]).await.unwrap_err();

    assert!(matches!(err, YatraError::Embedding(_)));
    assert!(err.to_string().contains("input too long"));
}

#[tokio::test]
async fn test_api_client_count_mismatch_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.1, 0.2]])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    let err = client.embed(&["one", "two"]).await.unwrap_err();

    assert!(err.to_string().contains("count mismatch"), "{err}");
}

#[tokio::test]
async fn test_api_client_dimension_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.1, 0.2]])),
        )
        .mount(&mock_server)
        .await;

    let config = ApiConfig {
        dimensions: Some(1024),
        ..test_config(&mock_server.uri())
    };
    let client = EmbeddingApiClient::new(config).unwrap();
    let err = client.embed(&["one"]).await.unwrap_err();

    assert!(err.to_string().contains("dimension mismatch"), "{err}");
}

#[tokio::test]
async fn test_api_client_malformed_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    assert!(matches!(
        client.embed(&["test"]).await,
        Err(YatraError::Embedding(_))
    ));
}

// =============================================================================
// Provider batching
// =============================================================================

#[tokio::test]
async fn test_provider_splits_batches_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(echo_embeddings)
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    let provider = EmbeddingProvider::from_client(client, 2);

    let texts: Vec<String> = ["a", "bb", "ccc", "dddd", "eeeee"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let embeddings = provider.embed_batch(&texts).await.unwrap();

    let lengths: Vec<f32> = embeddings.iter().map(|e| e[0]).collect();
    assert_eq!(lengths, vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    let requests = mock_server.received_requests().await.unwrap();
    let sizes: Vec<usize> = requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["input"].as_array().unwrap().len()
        })
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[tokio::test]
async fn test_provider_trims_inputs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_json(json!({
            "model": "cohere/embed-multilingual-v3.0",
            "input": ["Goa beaches"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.3, 0.4]])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    let provider = EmbeddingProvider::from_client(client, 8);

    let embedding = provider.embed("  Goa beaches \n").await.unwrap();
    assert_eq!(embedding, vec![0.3, 0.4]);
}
