use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::config::VectorConfig;
use crate::error::{Result, YatraError};
use crate::models::{IndexStats, QueryRequest, QueryResult, UpsertBatch};

use super::VectorIndex;

/// Client for a Chroma server's REST API.
///
/// The collection is resolved (or created, in cosine space) on first use and
/// its id cached. `reset` deletes the collection and forgets the id so the
/// next call recreates it.
pub struct ChromaIndex {
    client: Client,
    base_url: String,
    collection: String,
    tenant: String,
    database: String,
    collection_id: RwLock<Option<String>>,
}

impl ChromaIndex {
    pub fn new(config: &VectorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| YatraError::VectorIndex(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            tenant: config.tenant.clone(),
            database: config.database.clone(),
            collection_id: RwLock::new(None),
        })
    }

    fn scope(&self) -> [(&str, &str); 2] {
        [
            ("tenant", self.tenant.as_str()),
            ("database", self.database.as_str()),
        ]
    }

    async fn ensure_collection(&self) -> Result<String> {
        if let Some(id) = self.collection_id.read().await.as_ref() {
            return Ok(id.clone());
        }

        let mut cached = self.collection_id.write().await;
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let response = self
            .client
            .post(format!("{}/api/v1/collections", self.base_url))
            .query(&self.scope())
            .json(&json!({
                "name": self.collection,
                "metadata": { "hnsw:space": "cosine" },
                "get_or_create": true,
            }))
            .send()
            .await?;
        let body = expect_success(response, "create collection").await?;

        let id = unwrap_envelope(body)
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                YatraError::VectorIndex("Collection response carried no id".to_string())
            })?;

        tracing::debug!(collection = %self.collection, id = %id, "Resolved vector collection");
        *cached = Some(id.clone());
        Ok(id)
    }

    async fn forget_collection(&self) {
        *self.collection_id.write().await = None;
    }

    async fn count(&self, collection_id: &str) -> Result<usize> {
        let response = self
            .client
            .get(format!(
                "{}/api/v1/collections/{collection_id}/count",
                self.base_url
            ))
            .send()
            .await?;
        let body = expect_success(response, "count").await?;

        unwrap_envelope(body)
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| YatraError::VectorIndex("Count response was not a number".to_string()))
    }
}

#[async_trait]
impl VectorIndex for ChromaIndex {
    async fn upsert(&self, batch: UpsertBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        if !batch.is_consistent() {
            return Err(YatraError::VectorIndex(
                "Upsert arrays have different lengths".to_string(),
            ));
        }

        let collection_id = self.ensure_collection().await?;
        let metadatas: Vec<Map<String, Value>> =
            batch.metadatas.iter().map(|m| m.to_map()).collect();

        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{collection_id}/upsert",
                self.base_url
            ))
            .json(&json!({
                "ids": batch.ids,
                "embeddings": batch.embeddings,
                "documents": batch.documents,
                "metadatas": metadatas,
            }))
            .send()
            .await?;
        expect_success(response, "upsert").await?;

        tracing::debug!(count = batch.ids.len(), "Upserted vectors");
        Ok(())
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResult> {
        let query_count = request.query_embeddings.len();
        if query_count == 0 {
            return Ok(QueryResult::empty(0));
        }

        let collection_id = self.ensure_collection().await?;

        let mut body = json!({
            "query_embeddings": request.query_embeddings,
            "n_results": request.n_results.max(1),
            "include": ["documents", "metadatas", "distances"],
        });
        if let Some(clause) = request.filter.as_ref().and_then(|f| f.to_where()) {
            body["where"] = clause;
        }

        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{collection_id}/query",
                self.base_url
            ))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: Value = response.json().await?;
            return parse_query_result(unwrap_envelope(body), query_count);
        }

        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND || mentions_missing_collection(&text) {
            tracing::warn!(collection = %self.collection, "Collection missing during query");
            self.forget_collection().await;
            return Ok(QueryResult::empty(query_count));
        }

        // Older servers reject queries against an empty collection.
        if matches!(self.count(&collection_id).await, Ok(0)) {
            return Ok(QueryResult::empty(query_count));
        }

        Err(YatraError::VectorIndex(format!(
            "Chroma query failed ({status}): {}",
            preview(&text)
        )))
    }

    async fn reset(&self) -> Result<()> {
        let response = self
            .client
            .delete(format!(
                "{}/api/v1/collections/{}",
                self.base_url, self.collection
            ))
            .query(&self.scope())
            .send()
            .await?;

        let status = response.status();
        self.forget_collection().await;

        if status.is_success() {
            tracing::info!(collection = %self.collection, "Cleared vector collection");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND || mentions_missing_collection(&text) {
            tracing::info!(collection = %self.collection, "No existing collection to clear");
            return Ok(());
        }

        Err(YatraError::VectorIndex(format!(
            "Chroma delete collection failed ({status}): {}",
            preview(&text)
        )))
    }

    async fn stats(&self) -> Result<IndexStats> {
        let collection_id = self.ensure_collection().await?;
        let count = self.count(&collection_id).await?;

        Ok(IndexStats {
            name: self.collection.clone(),
            count,
            endpoint: self.base_url.clone(),
        })
    }
}

async fn expect_success(response: Response, operation: &str) -> Result<Value> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    Err(YatraError::VectorIndex(format!(
        "Chroma {operation} failed ({status}): {}",
        preview(&text)
    )))
}

fn preview(text: &str) -> String {
    text.chars().take(500).collect()
}

fn mentions_missing_collection(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("does not exist") || lower.contains("not found")
}

/// Strip up to two `{data: ...}` wrappers a gateway may add around a payload.
fn unwrap_envelope(mut value: Value) -> Value {
    for _ in 0..2 {
        let is_wrapper = value.as_object().is_some_and(|map| {
            map.contains_key("data") && !map.contains_key("ids") && !map.contains_key("id")
        });
        if !is_wrapper {
            break;
        }
        value = value["data"].take();
    }
    value
}

/// `value[key]` as a list of lists, `null` entries treated as empty.
fn nested<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Result<Vec<Vec<T>>> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| YatraError::VectorIndex(format!("Malformed '{key}' in query result: {e}"))),
    }
}

fn parse_query_result(value: Value, query_count: usize) -> Result<QueryResult> {
    if value.is_array() {
        // Flat list of matches for a single query vector.
        let matches = value.as_array().cloned().unwrap_or_default();
        let mut result = QueryResult::empty(1);
        for m in matches {
            let Some(id) = m.get("id").and_then(Value::as_str) else {
                continue;
            };
            result.ids[0].push(id.to_string());
            result.documents[0].push(m.get("document").and_then(Value::as_str).map(str::to_string));
            result.metadatas[0].push(m.get("metadata").and_then(Value::as_object).cloned());
            result.distances[0].push(m.get("distance").and_then(Value::as_f64).unwrap_or(1.0) as f32);
        }
        return Ok(result);
    }

    let mut result = QueryResult {
        ids: nested(&value, "ids")?,
        documents: nested(&value, "documents")?,
        metadatas: nested(&value, "metadatas")?,
        distances: nested(&value, "distances")?,
    };

    if result.ids.is_empty() {
        return Ok(QueryResult::empty(query_count));
    }

    // Pad missing parallel arrays so consumers can index them by position.
    for (i, ids) in result.ids.iter().enumerate() {
        let n = ids.len();
        if result.documents.len() <= i {
            result.documents.push(Vec::new());
        }
        if result.metadatas.len() <= i {
            result.metadatas.push(Vec::new());
        }
        if result.distances.len() <= i {
            result.distances.push(Vec::new());
        }
        result.documents[i].resize(n, None);
        result.metadatas[i].resize(n, None);
        result.distances[i].resize(n, 1.0);
    }

    Ok(result)
}
