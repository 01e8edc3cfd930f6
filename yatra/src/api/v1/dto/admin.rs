//! Admin DTOs for the v1 API.

use serde::Serialize;

use crate::ingest::IngestReport;
use crate::models::IndexStats;

/// Response for `GET /v1/admin/index`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatsResponse {
    /// Collection name.
    pub name: String,
    /// Number of indexed documents.
    pub count: usize,
    pub endpoint: String,
}

impl From<IndexStats> for IndexStatsResponse {
    fn from(stats: IndexStats) -> Self {
        Self {
            name: stats.name,
            count: stats.count,
            endpoint: stats.endpoint,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCountResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
}

/// Response for `POST /v1/admin/index:rebuild`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RebuildIndexResponse {
    /// Documents indexed per category, in ingestion order.
    pub categories: Vec<CategoryCountResponse>,
    /// Categories with no records.
    pub skipped: Vec<String>,
    pub total: usize,
    pub elapsed_ms: u64,
}

impl From<IngestReport> for RebuildIndexResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            categories: report
                .categories
                .into_iter()
                .map(|c| CategoryCountResponse {
                    kind: c.kind.to_string(),
                    count: c.count,
                })
                .collect(),
            skipped: report.skipped.iter().map(ToString::to_string).collect(),
            total: report.total,
            elapsed_ms: report.elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::CategoryCount;
    use crate::models::KnowledgeType;

    #[test]
    fn rebuild_response_serializes_camel_case() {
        let report = IngestReport {
            categories: vec![CategoryCount {
                kind: KnowledgeType::Trek,
                count: 4,
            }],
            skipped: vec![KnowledgeType::Shloka],
            total: 4,
            elapsed_ms: 250,
        };
        let json = serde_json::to_value(RebuildIndexResponse::from(report)).expect("serialize");
        assert_eq!(json["categories"][0]["type"], "trek");
        assert_eq!(json["categories"][0]["count"], 4);
        assert_eq!(json["skipped"][0], "shloka");
        assert_eq!(json["elapsedMs"], 250);
    }
}
