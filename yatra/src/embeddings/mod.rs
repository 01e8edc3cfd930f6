mod api;
mod provider;
mod retry;

#[cfg(test)]
mod tests;

pub use api::{ApiConfig, EmbeddingApiClient};
pub use provider::{deterministic_vector, EmbeddingProvider, TextEmbedder};
pub use retry::{retry_with_backoff, RetryPolicy};
