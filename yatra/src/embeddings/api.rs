use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, StatusCode,
};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::retry::{retry_with_backoff, RetryPolicy};
use crate::error::{Result, YatraError};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
    pub dimensions: Option<usize>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

/// One failed request, tagged with whether it is worth repeating.
struct AttemptError {
    error: YatraError,
    retryable: bool,
}

impl AttemptError {
    fn transient(error: YatraError) -> Self {
        Self {
            error,
            retryable: true,
        }
    }

    fn fatal(error: YatraError) -> Self {
        Self {
            error,
            retryable: false,
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.error.fmt(f)
    }
}

/// Client for OpenAI-compatible `/embeddings` endpoints.
#[derive(Clone)]
pub struct EmbeddingApiClient {
    client: Client,
    headers: HeaderMap,
    config: ApiConfig,
}

impl EmbeddingApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| YatraError::Embedding(format!("Failed to create HTTP client: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref api_key) = config.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|e| YatraError::Embedding(format!("Invalid API key header: {e}")))?,
            );
        }

        Ok(Self {
            client,
            headers,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Embed one request's worth of texts. Transient failures (429, 5xx,
    /// connection errors and timeouts) are retried per the configured policy.
    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts.to_vec(),
        };
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        let (url, request) = (url.as_str(), &request);

        let body = retry_with_backoff(
            &self.config.retry,
            move |_| self.send_once(url, request),
            |e: &AttemptError| e.retryable,
        )
        .await
        .map_err(|e| e.error)?;

        let embeddings = parse_embeddings(body)?;

        if embeddings.len() != texts.len() {
            return Err(YatraError::Embedding(format!(
                "Embedding count mismatch: sent {} inputs, received {} vectors",
                texts.len(),
                embeddings.len()
            )));
        }

        if let Some(expected) = self.config.dimensions {
            if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
                return Err(YatraError::Embedding(format!(
                    "Embedding dimension mismatch: expected {expected}, received {}",
                    bad.len()
                )));
            }
        }

        Ok(embeddings)
    }

    async fn send_once(
        &self,
        url: &str,
        request: &EmbeddingRequest<'_>,
    ) -> std::result::Result<Value, AttemptError> {
        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AttemptError::transient(YatraError::Embedding(format!("Request failed: {e}")))
            })?;

        let status = response.status();

        if status.is_success() {
            return response.json::<Value>().await.map_err(|e| {
                AttemptError::fatal(YatraError::Embedding(format!(
                    "Failed to parse response: {e}"
                )))
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            return Err(AttemptError::transient(YatraError::ApiRateLimit {
                retry_after,
            }));
        }

        let body = preview(&response.text().await.unwrap_or_default());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AttemptError::fatal(YatraError::ApiAuth(body)));
        }

        if status.is_server_error() {
            return Err(AttemptError::transient(YatraError::Embedding(format!(
                "Server error {status}: {body}"
            ))));
        }

        Err(AttemptError::fatal(YatraError::Embedding(format!(
            "API error {status}: {body}"
        ))))
    }
}

fn preview(body: &str) -> String {
    body.chars().take(1000).collect()
}

/// Pull the vectors out of whatever envelope the provider or gateway used:
/// a bare list, `{data: [...]}` or `{data: {data: [...]}}`, with each item
/// carrying `embedding` or `vector`.
pub(crate) fn parse_embeddings(body: Value) -> Result<Vec<Vec<f32>>> {
    let unexpected =
        |body: &Value| YatraError::Embedding(format!("Unexpected embedding response: {}", preview(&body.to_string())));

    let items = match &body {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Object(inner)) => match inner.get("data") {
                Some(Value::Array(items)) => items,
                _ => return Err(unexpected(&body)),
            },
            _ => return Err(unexpected(&body)),
        },
        _ => return Err(unexpected(&body)),
    };

    let mut indexed = items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let vector = item
                .get("embedding")
                .or_else(|| item.get("vector"))
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    YatraError::Embedding(format!("Missing embedding at position {position}"))
                })?
                .iter()
                .map(|n| {
                    n.as_f64().map(|f| f as f32).ok_or_else(|| {
                        YatraError::Embedding(format!("Non-numeric embedding at position {position}"))
                    })
                })
                .collect::<Result<Vec<f32>>>()?;

            let order = item
                .get("index")
                .and_then(Value::as_u64)
                .map(|i| i as usize)
                .unwrap_or(position);
            Ok((order, vector))
        })
        .collect::<Result<Vec<_>>>()?;

    indexed.sort_by_key(|(order, _)| *order);
    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}
