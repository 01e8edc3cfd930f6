mod chroma;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::error::Result;
use crate::models::{IndexStats, QueryRequest, QueryResult, UpsertBatch};

pub use chroma::ChromaIndex;
pub use memory::InMemoryIndex;

/// A nearest-neighbour index over knowledge vectors.
///
/// Distances are cosine distances: 0 for identical direction.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, batch: UpsertBatch) -> Result<()>;

    async fn query(&self, request: QueryRequest) -> Result<QueryResult>;

    /// Drop every entry. The next call starts from an empty collection.
    async fn reset(&self) -> Result<()>;

    async fn stats(&self) -> Result<IndexStats>;
}

/// A vector index shared between live queries and maintenance runs.
///
/// Queries hold the read side of a gate for their duration; maintenance
/// (reset + reload) holds the write side, so no query ever observes a
/// half-rebuilt index.
#[derive(Clone)]
pub struct SharedIndex {
    index: Arc<dyn VectorIndex>,
    gate: Arc<RwLock<()>>,
}

impl SharedIndex {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self {
            index,
            gate: Arc::new(RwLock::new(())),
        }
    }

    pub async fn query(&self, request: QueryRequest) -> Result<QueryResult> {
        let _read = self.gate.read().await;
        self.index.query(request).await
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        let _read = self.gate.read().await;
        self.index.stats().await
    }

    /// Wait for in-flight queries to drain and take exclusive access.
    pub async fn maintenance(&self) -> Maintenance<'_> {
        let permit = self.gate.write().await;
        tracing::debug!("Vector index maintenance window opened");
        Maintenance {
            index: self.index.as_ref(),
            _permit: permit,
        }
    }
}

/// Exclusive access to the index. Queries wait until this is dropped.
pub struct Maintenance<'a> {
    index: &'a dyn VectorIndex,
    _permit: RwLockWriteGuard<'a, ()>,
}

impl Maintenance<'_> {
    pub async fn reset(&self) -> Result<()> {
        self.index.reset().await
    }

    pub async fn upsert(&self, batch: UpsertBatch) -> Result<()> {
        self.index.upsert(batch).await
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        self.index.stats().await
    }
}
