use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Result, YatraError};
use crate::models::{DocumentMetadata, IndexStats, QueryRequest, QueryResult, UpsertBatch};

use super::VectorIndex;

struct StoredEntry {
    id: String,
    embedding: Vec<f32>,
    document: String,
    metadata: DocumentMetadata,
}

/// Brute-force cosine index held in process memory.
pub struct InMemoryIndex {
    name: String,
    entries: RwLock<Vec<StoredEntry>>,
}

impl InMemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(Vec::new()),
        }
    }
}

fn poisoned<T>(_: T) -> YatraError {
    YatraError::VectorIndex("In-memory index lock poisoned".to_string())
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        1.0
    } else {
        1.0 - dot / (mag_a * mag_b)
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, batch: UpsertBatch) -> Result<()> {
        if !batch.is_consistent() {
            return Err(YatraError::VectorIndex(
                "Upsert arrays have different lengths".to_string(),
            ));
        }

        let mut entries = self.entries.write().map_err(poisoned)?;
        let expected_dims = entries.first().map(|e| e.embedding.len());

        for (((id, embedding), document), metadata) in batch
            .ids
            .into_iter()
            .zip(batch.embeddings)
            .zip(batch.documents)
            .zip(batch.metadatas)
        {
            let dims = expected_dims.unwrap_or(embedding.len());
            if embedding.len() != dims {
                return Err(YatraError::VectorIndex(format!(
                    "Embedding for {id} has {} dimensions, index holds {dims}",
                    embedding.len()
                )));
            }

            let entry = StoredEntry {
                id,
                embedding,
                document,
                metadata,
            };
            match entries.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }

        Ok(())
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResult> {
        let entries = self.entries.read().map_err(poisoned)?;
        let mut result = QueryResult::empty(0);

        for query in &request.query_embeddings {
            let mut hits: Vec<(f32, &StoredEntry)> = entries
                .iter()
                .filter(|e| {
                    request
                        .filter
                        .as_ref()
                        .map_or(true, |f| f.matches(&e.metadata))
                })
                .map(|e| (cosine_distance(query, &e.embedding), e))
                .collect();
            hits.sort_by(|a, b| a.0.total_cmp(&b.0));
            hits.truncate(request.n_results);

            result.ids.push(hits.iter().map(|(_, e)| e.id.clone()).collect());
            result
                .documents
                .push(hits.iter().map(|(_, e)| Some(e.document.clone())).collect());
            result
                .metadatas
                .push(hits.iter().map(|(_, e)| Some(e.metadata.to_map())).collect());
            result.distances.push(hits.iter().map(|(d, _)| *d).collect());
        }

        Ok(result)
    }

    async fn reset(&self) -> Result<()> {
        self.entries.write().map_err(poisoned)?.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            name: self.name.clone(),
            count: self.entries.read().map_err(poisoned)?.len(),
            endpoint: "memory".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetadataFilter;

    fn meta(kind: &str) -> DocumentMetadata {
        DocumentMetadata {
            kind: kind.to_string(),
            category: "general".to_string(),
            state: None,
            name: String::new(),
            difficulty: None,
            content: "{}".to_string(),
        }
    }

    fn batch(entries: &[(&str, Vec<f32>, &str)]) -> UpsertBatch {
        let mut batch = UpsertBatch::default();
        for (id, embedding, kind) in entries {
            batch.ids.push(id.to_string());
            batch.embeddings.push(embedding.clone());
            batch.documents.push(format!("doc {id}"));
            batch.metadatas.push(meta(kind));
        }
        batch
    }

    fn request(vector: Vec<f32>, n_results: usize) -> QueryRequest {
        QueryRequest {
            query_embeddings: vec![vector],
            n_results,
            filter: None,
        }
    }

    #[tokio::test]
    async fn nearest_first_with_cosine_distance() {
        let index = InMemoryIndex::new("test");
        index
            .upsert(batch(&[
                ("far", vec![0.0, 1.0], "trek"),
                ("near", vec![1.0, 0.1], "trek"),
                ("exact", vec![2.0, 0.0], "trek"),
            ]))
            .await
            .unwrap();

        let result = index.query(request(vec![1.0, 0.0], 2)).await.unwrap();
        assert_eq!(result.ids, vec![vec!["exact".to_string(), "near".to_string()]]);
        assert!(result.distances[0][0].abs() < 1e-6);
        assert!(result.distances[0][1] > 0.0);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let index = InMemoryIndex::new("test");
        index.upsert(batch(&[("a", vec![1.0, 0.0], "trek")])).await.unwrap();
        index.upsert(batch(&[("a", vec![0.0, 1.0], "cuisine")])).await.unwrap();

        assert_eq!(index.stats().await.unwrap().count, 1);
        let result = index.query(request(vec![0.0, 1.0], 1)).await.unwrap();
        assert!(result.distances[0][0].abs() < 1e-6);
    }

    #[tokio::test]
    async fn filter_and_empty_index() {
        let index = InMemoryIndex::new("test");
        let result = index.query(request(vec![1.0, 0.0], 5)).await.unwrap();
        assert!(result.is_empty());

        index
            .upsert(batch(&[("t", vec![1.0, 0.0], "trek"), ("c", vec![1.0, 0.0], "cuisine")]))
            .await
            .unwrap();
        let result = index
            .query(QueryRequest {
                filter: Some(MetadataFilter::new().eq("type", "cuisine")),
                ..request(vec![1.0, 0.0], 5)
            })
            .await
            .unwrap();
        assert_eq!(result.ids, vec![vec!["c".to_string()]]);
    }

    #[tokio::test]
    async fn rejects_dimension_changes() {
        let index = InMemoryIndex::new("test");
        index.upsert(batch(&[("a", vec![1.0, 0.0], "trek")])).await.unwrap();
        let err = index.upsert(batch(&[("b", vec![1.0, 0.0, 0.0], "trek")])).await;
        assert!(err.is_err());

        index.reset().await.unwrap();
        assert_eq!(index.stats().await.unwrap().count, 0);
        index.upsert(batch(&[("b", vec![1.0, 0.0, 0.0], "trek")])).await.unwrap();
    }
}
