//! v1 Admin handlers.

use axum::extract::State;

use crate::api::v1::dto::{IndexStatsResponse, RebuildIndexResponse};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;

/// `GET /api/v1/admin/index`
#[utoipa::path(
    get,
    path = "/api/v1/admin/index",
    tag = "admin",
    responses(
        (status = 200, description = "Vector index statistics", body = IndexStatsResponse),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn index_stats(State(state): State<AppState>) -> ApiResponse<IndexStatsResponse> {
    match state.index.stats().await {
        Ok(stats) => ApiResponse::success(stats.into()),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/admin/index:rebuild`
///
/// Clears the index and re-ingests every category. Searches wait until the
/// rebuild finishes.
#[utoipa::path(
    post,
    path = "/api/v1/admin/index:rebuild",
    tag = "admin",
    responses(
        (status = 200, description = "Index rebuilt", body = RebuildIndexResponse),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
        (status = 500, description = "Ingestion failed", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn rebuild_index(State(state): State<AppState>) -> ApiResponse<RebuildIndexResponse> {
    match state.ingestion.ingest_all().await {
        Ok(report) => {
            tracing::info!(total = report.total, elapsed_ms = report.elapsed_ms, "Index rebuilt");
            ApiResponse::success(report.into())
        }
        Err(e) => e.into(),
    }
}
