use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::knowledge::{KnowledgeRecord, KnowledgeType};

/// Metadata stored next to each vector.
///
/// `content` carries the full record JSON so a retrieved hit can be decoded
/// back into its typed variant without touching the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl DocumentMetadata {
    /// Lenient decoding of whatever metadata map the index hands back.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            kind: text("type").unwrap_or_else(|| "unknown".to_string()),
            category: text("category").unwrap_or_else(|| "general".to_string()),
            state: text("state"),
            name: text("name").unwrap_or_default(),
            difficulty: text("difficulty"),
            content: text("content").unwrap_or_default(),
        }
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// A normalized record ready to be embedded.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddableDocument {
    pub id: String,
    pub kind: KnowledgeType,
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// Parallel arrays for one upsert call. Position `i` of every array belongs to
/// the same entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsertBatch {
    pub ids: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub documents: Vec<String>,
    pub metadatas: Vec<DocumentMetadata>,
}

impl UpsertBatch {
    pub fn from_documents(documents: Vec<EmbeddableDocument>, embeddings: Vec<Vec<f32>>) -> Self {
        let mut batch = Self {
            embeddings,
            ..Default::default()
        };
        for doc in documents {
            batch.ids.push(doc.id);
            batch.documents.push(doc.text);
            batch.metadatas.push(doc.metadata);
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All parallel arrays have the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.ids.len();
        self.embeddings.len() == n && self.documents.len() == n && self.metadatas.len() == n
    }
}

/// Equality constraints on metadata, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    clauses: Vec<(String, String)>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(String, String)] {
        &self.clauses
    }

    pub fn matches(&self, metadata: &DocumentMetadata) -> bool {
        let map = metadata.to_map();
        self.clauses
            .iter()
            .all(|(key, value)| map.get(key).and_then(Value::as_str) == Some(value.as_str()))
    }

    /// Render as a Chroma `where` clause: a bare `{"k": v}` for one clause,
    /// `{"$and": [...]}` for several, `None` when empty.
    pub fn to_where(&self) -> Option<Value> {
        let mut clauses: Vec<Value> = self
            .clauses
            .iter()
            .map(|(key, value)| {
                let mut clause = Map::new();
                clause.insert(key.clone(), Value::String(value.clone()));
                Value::Object(clause)
            })
            .collect();

        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => {
                let mut and = Map::new();
                and.insert("$and".to_string(), Value::Array(clauses));
                Some(Value::Object(and))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub query_embeddings: Vec<Vec<f32>>,
    pub n_results: usize,
    pub filter: Option<MetadataFilter>,
}

/// Nearest-neighbour results, one inner array per query vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub documents: Vec<Vec<Option<String>>>,
    #[serde(default)]
    pub metadatas: Vec<Vec<Option<Map<String, Value>>>>,
    #[serde(default)]
    pub distances: Vec<Vec<f32>>,
}

impl QueryResult {
    pub fn empty(query_count: usize) -> Self {
        Self {
            ids: vec![Vec::new(); query_count],
            documents: vec![Vec::new(); query_count],
            metadatas: vec![Vec::new(); query_count],
            distances: vec![Vec::new(); query_count],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.iter().all(Vec::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    pub id: String,
    pub content: KnowledgeRecord,
    pub metadata: DocumentMetadata,
    pub distance: f32,
    pub score: f32,
}

impl RetrievedDocument {
    /// Label used when listing the document in a prompt.
    pub fn category_label(&self) -> &str {
        if !self.metadata.category.is_empty() {
            &self.metadata.category
        } else {
            &self.metadata.kind
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub name: String,
    pub count: usize,
    pub endpoint: String,
}
