use async_trait::async_trait;
use std::time::Duration;

use super::api::{ApiConfig, EmbeddingApiClient};
use super::retry::RetryPolicy;
use crate::config::{default_base_url, parse_provider_model, EmbeddingsConfig, DEFAULT_MOCK_DIMENSIONS};
use crate::error::{Result, YatraError};

const LEHMER_MODULUS: u64 = 2_147_483_647;
const LEHMER_MULTIPLIER: u64 = 48_271;

/// Text to vector, at the seam where tests substitute their own embedders.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Order-preserving: output `i` embeds input `i`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Clone)]
enum EmbeddingBackend {
    Api {
        client: EmbeddingApiClient,
        batch_size: usize,
    },
    Mock {
        dimensions: usize,
    },
}

#[derive(Clone)]
pub struct EmbeddingProvider {
    backend: EmbeddingBackend,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        if config.mock {
            tracing::warn!("Mock embeddings enabled; vectors carry no meaning");
            return Ok(Self::mock(config.dimensions.unwrap_or(DEFAULT_MOCK_DIMENSIONS)));
        }

        let (provider, model_name) = parse_provider_model(&config.model);
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());

        let needs_api_key = !matches!(provider.to_lowercase().as_str(), "ollama" | "lmstudio");
        if needs_api_key && config.api_key.is_none() {
            return Err(YatraError::Embedding(format!(
                "API key required for embedding provider {provider}"
            )));
        }

        let client = EmbeddingApiClient::new(ApiConfig {
            base_url,
            api_key: config.api_key.clone(),
            model: model_name.to_string(),
            timeout_secs: config.timeout_secs,
            retry: RetryPolicy::new(
                config.max_retries,
                Duration::from_millis(config.initial_retry_delay_ms),
            ),
            dimensions: config.dimensions,
        })?;

        Ok(Self::from_client(client, config.batch_size))
    }

    pub fn from_client(client: EmbeddingApiClient, batch_size: usize) -> Self {
        Self {
            backend: EmbeddingBackend::Api {
                client,
                batch_size: batch_size.max(1),
            },
        }
    }

    /// Deterministic vectors derived from text length. For development and
    /// tests only.
    pub fn mock(dimensions: usize) -> Self {
        Self {
            backend: EmbeddingBackend::Mock { dimensions },
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self.backend, EmbeddingBackend::Mock { .. })
    }

    pub fn model(&self) -> &str {
        match &self.backend {
            EmbeddingBackend::Api { client, .. } => client.model(),
            EmbeddingBackend::Mock { .. } => "mock",
        }
    }
}

#[async_trait]
impl TextEmbedder for EmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(YatraError::Validation(
                "Cannot embed empty text".to_string(),
            ));
        }

        match &self.backend {
            EmbeddingBackend::Mock { dimensions } => {
                Ok(deterministic_vector(js_length(text) + 1, *dimensions))
            }
            EmbeddingBackend::Api { client, .. } => client
                .embed(&[text.trim()])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| YatraError::Embedding("No embedding returned".to_string())),
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(YatraError::Validation(
                "Cannot embed an empty batch".to_string(),
            ));
        }

        match &self.backend {
            EmbeddingBackend::Mock { dimensions } => Ok(texts
                .iter()
                .enumerate()
                .map(|(idx, text)| deterministic_vector(js_length(text) + idx as u64 + 1, *dimensions))
                .collect()),
            EmbeddingBackend::Api { client, batch_size } => {
                let total_batches = texts.len().div_ceil(*batch_size);
                let mut all_embeddings = Vec::with_capacity(texts.len());

                for (batch_idx, batch) in texts.chunks(*batch_size).enumerate() {
                    let trimmed: Vec<&str> = batch.iter().map(|t| t.trim()).collect();
                    let mut embedded = client.embed(&trimmed).await.map_err(|e| match e {
                        YatraError::Embedding(msg) => YatraError::Embedding(format!(
                            "Batch {}/{total_batches} failed: {msg}",
                            batch_idx + 1
                        )),
                        other => other,
                    })?;
                    all_embeddings.append(&mut embedded);
                    tracing::debug!(
                        batch = batch_idx + 1,
                        total_batches,
                        "Generated embeddings for batch"
                    );
                }

                Ok(all_embeddings)
            }
        }
    }
}

/// Length in UTF-16 code units, so mock vectors match what other tooling
/// produced for the same catalog.
fn js_length(text: &str) -> u64 {
    text.encode_utf16().count() as u64
}

/// Lehmer generator output mapped into [-1, 1).
pub fn deterministic_vector(seed: u64, dimensions: usize) -> Vec<f32> {
    let mut state = seed % LEHMER_MODULUS;
    if state == 0 {
        state = 1;
    }

    (0..dimensions)
        .map(|_| {
            state = (state * LEHMER_MULTIPLIER) % LEHMER_MODULUS;
            ((state as f64 / LEHMER_MODULUS as f64) * 2.0 - 1.0) as f32
        })
        .collect()
}
