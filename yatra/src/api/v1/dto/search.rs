//! Search request/response DTOs for the v1 API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::RetrievedDocument;

/// Largest `topK` a caller may ask for.
pub const MAX_TOP_K: usize = 50;

/// Request body for `POST /v1/search`.
///
/// Exactly one mode applies, checked in this order: `queries` (several
/// related queries merged), `category` (everything filed under one
/// category), then `query` with the optional `type` and `state` filters.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub queries: Vec<String>,
    pub category: Option<String>,
    /// Knowledge type filter, e.g. `trek` or `spiritual_site`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub state: Option<String>,
    pub top_k: Option<usize>,
}

/// One retrieved knowledge document.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHit {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Similarity in `[0, 1]`, higher is closer.
    pub score: f32,
    pub distance: f32,
    /// The full catalog record.
    #[schema(value_type = Object)]
    pub content: Value,
}

impl From<RetrievedDocument> for DocumentHit {
    fn from(doc: RetrievedDocument) -> Self {
        let content = serde_json::to_value(&doc.content).unwrap_or(Value::Null);
        Self {
            id: doc.id,
            kind: doc.metadata.kind,
            category: doc.metadata.category,
            name: doc.metadata.name,
            state: doc.metadata.state,
            score: doc.score,
            distance: doc.distance,
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<DocumentHit>,
    pub confidence: f32,
    pub total: usize,
    pub timing_ms: u64,
}
