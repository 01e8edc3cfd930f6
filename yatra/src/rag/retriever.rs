use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::embeddings::TextEmbedder;
use crate::error::{Result, YatraError};
use crate::models::{
    DocumentMetadata, KnowledgeRecord, KnowledgeType, MetadataFilter, QueryRequest,
    RetrievedDocument,
};
use crate::vector::SharedIndex;

pub const DEFAULT_TOP_K: usize = 5;
pub const MULTI_QUERY_TOP_K: usize = 3;
pub const MULTI_QUERY_LIMIT: usize = 10;
pub const CATEGORY_LIMIT: usize = 10;

/// Embeds a query and turns the index's nearest neighbours into typed
/// documents with similarity scores.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn TextEmbedder>,
    index: SharedIndex,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn TextEmbedder>, index: SharedIndex) -> Self {
        Self { embedder, index }
    }

    /// Nearest `top_k` documents, nearest first. The index order is kept as is.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        filter_type: Option<KnowledgeType>,
        filter_state: Option<&str>,
    ) -> Result<Vec<RetrievedDocument>> {
        let mut filter = MetadataFilter::new();
        if let Some(kind) = filter_type {
            filter = filter.eq("type", kind.as_str());
        }
        if let Some(state) = filter_state.filter(|s| !s.trim().is_empty()) {
            filter = filter.eq("state", state);
        }

        self.search(query, top_k, filter).await
    }

    /// Several related queries, merged into one list of at most ten documents.
    ///
    /// A document returned by more than one query appears once, with the
    /// score from the first query that returned it. Equal scores keep
    /// first-seen order.
    pub async fn retrieve_multi(
        &self,
        queries: &[&str],
        top_k_per_query: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        let mut merged: Vec<RetrievedDocument> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for query in queries {
            for doc in self.retrieve(query, top_k_per_query, None, None).await? {
                if seen.insert(doc.id.clone()) {
                    merged.push(doc);
                }
            }
        }

        merged.sort_by(|a, b| b.score.total_cmp(&a.score));
        merged.truncate(MULTI_QUERY_LIMIT);
        Ok(merged)
    }

    pub async fn retrieve_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        let query = format!("Information about {category}");
        self.search(&query, limit, MetadataFilter::new().eq("category", category))
            .await
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: MetadataFilter,
    ) -> Result<Vec<RetrievedDocument>> {
        if query.trim().is_empty() {
            return Err(YatraError::Validation("Query cannot be empty".to_string()));
        }

        let embedding = self.embedder.embed(query).await?;
        let request = QueryRequest {
            query_embeddings: vec![embedding],
            n_results: top_k.max(1),
            filter: (!filter.is_empty()).then_some(filter),
        };

        let result = self.index.query(request).await?;

        let Some(ids) = result.ids.into_iter().next() else {
            return Ok(Vec::new());
        };
        let mut documents = result.documents.into_iter().next().unwrap_or_default();
        let mut metadatas = result.metadatas.into_iter().next().unwrap_or_default();
        let distances = result.distances.into_iter().next().unwrap_or_default();

        let docs: Vec<RetrievedDocument> = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let document = documents.get_mut(i).and_then(Option::take);
                let metadata = metadatas
                    .get_mut(i)
                    .and_then(Option::take)
                    .map(|m| DocumentMetadata::from_map(&m));
                let distance = distances.get(i).copied().unwrap_or(1.0);
                to_retrieved(id, document, metadata, distance)
            })
            .collect();

        tracing::debug!(
            query_len = query.len(),
            results = docs.len(),
            top_score = docs.first().map(|d| d.score),
            "Retrieved documents"
        );
        Ok(docs)
    }
}

/// Similarity in `[0, 1]` for a cosine distance.
pub fn score_from_distance(distance: f32) -> f32 {
    if distance.is_nan() {
        return 0.0;
    }
    (1.0 - distance).clamp(0.0, 1.0)
}

fn to_retrieved(
    id: String,
    document: Option<String>,
    metadata: Option<DocumentMetadata>,
    distance: f32,
) -> RetrievedDocument {
    let metadata = metadata.unwrap_or_else(|| DocumentMetadata {
        kind: "unknown".to_string(),
        category: "general".to_string(),
        state: None,
        name: String::new(),
        difficulty: None,
        content: String::new(),
    });

    let stored = serde_json::from_str::<Value>(&metadata.content)
        .ok()
        .or_else(|| document.as_deref().and_then(|d| serde_json::from_str(d).ok()));

    let content = match stored {
        Some(value) => KnowledgeRecord::decode(&metadata.kind, value),
        None => KnowledgeRecord::Unknown {
            kind: metadata.kind.clone(),
            raw: document.map(Value::String).unwrap_or(Value::Null),
        },
    };

    RetrievedDocument {
        id,
        content,
        metadata,
        distance,
        score: score_from_distance(distance),
    }
}
