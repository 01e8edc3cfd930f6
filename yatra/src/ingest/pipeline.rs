use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::embeddings::TextEmbedder;
use crate::error::{Result, YatraError};
use crate::knowledge::{to_embeddable, ContentStore};
use crate::models::{EmbeddableDocument, KnowledgeType, UpsertBatch};
use crate::vector::{Maintenance, SharedIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub kind: KnowledgeType,
    pub count: usize,
}

/// Outcome of a full rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub categories: Vec<CategoryCount>,
    pub skipped: Vec<KnowledgeType>,
    pub total: usize,
    pub elapsed_ms: u64,
}

/// Rebuilds the vector index from the content store.
///
/// Every run clears the index first, then loads the eleven categories in a
/// fixed order. A failure anywhere stops the run; queries stay blocked until
/// it returns either way.
#[derive(Clone)]
pub struct IngestionPipeline {
    content: Arc<dyn ContentStore>,
    embedder: Arc<dyn TextEmbedder>,
    index: SharedIndex,
}

impl IngestionPipeline {
    pub fn new(
        content: Arc<dyn ContentStore>,
        embedder: Arc<dyn TextEmbedder>,
        index: SharedIndex,
    ) -> Self {
        Self {
            content,
            embedder,
            index,
        }
    }

    pub async fn ingest_all(&self) -> Result<IngestReport> {
        let started = Instant::now();
        let maintenance = self.index.maintenance().await;

        tracing::info!("Starting knowledge ingestion");
        maintenance.reset().await?;

        let mut categories = Vec::with_capacity(KnowledgeType::ALL.len());
        let mut skipped = Vec::new();

        for kind in KnowledgeType::ALL {
            let count = match self.ingest_category(&maintenance, kind).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::error!(category = %kind, error = %e, "Ingestion aborted");
                    if let Err(reset_error) = maintenance.reset().await {
                        tracing::error!(
                            error = %reset_error,
                            "Failed to clear partially ingested index"
                        );
                    }
                    return Err(e);
                }
            };

            if count == 0 {
                skipped.push(kind);
            } else {
                categories.push(CategoryCount { kind, count });
            }
        }

        let total = categories.iter().map(|c| c.count).sum();
        let stats = maintenance.stats().await?;
        drop(maintenance);

        let report = IngestReport {
            categories,
            skipped,
            total,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            total = report.total,
            indexed = stats.count,
            skipped = report.skipped.len(),
            elapsed_ms = report.elapsed_ms,
            "Knowledge ingestion complete"
        );
        Ok(report)
    }

    async fn ingest_category(
        &self,
        maintenance: &Maintenance<'_>,
        kind: KnowledgeType,
    ) -> Result<usize> {
        let records = self.content.load(kind).await?;
        if records.is_empty() {
            tracing::warn!(category = %kind, "No records found, skipping category");
            return Ok(0);
        }

        let documents = records
            .iter()
            .map(to_embeddable)
            .collect::<Result<Vec<EmbeddableDocument>>>()?;
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();

        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(YatraError::Embedding(format!(
                "{kind}: expected {} embeddings, received {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let count = documents.len();
        maintenance
            .upsert(UpsertBatch::from_documents(documents, embeddings))
            .await?;

        tracing::info!(category = %kind, count, "Indexed category");
        Ok(count)
    }
}
