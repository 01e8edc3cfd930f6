//! v1 Search handler.
//!
//! `POST /api/v1/search` runs retrieval only: no persona, no generation.

use axum::extract::State;
use std::time::Instant;

use crate::api::v1::dto::{SearchRequest, SearchResponse, MAX_TOP_K};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::error::Result;
use crate::models::{KnowledgeType, RetrievedDocument};
use crate::rag::{confidence, CATEGORY_LIMIT, DEFAULT_TOP_K, MULTI_QUERY_TOP_K};

/// `POST /api/v1/search`
#[utoipa::path(
    post,
    path = "/api/v1/search",
    tag = "search",
    operation_id = "search.search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search results", body = SearchResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn search(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<SearchRequest>,
) -> ApiResponse<SearchResponse> {
    if let Some(top_k) = req.top_k {
        if top_k == 0 || top_k > MAX_TOP_K {
            return ApiResponse::error(
                ErrorCode::InvalidRequest,
                format!("topK must be between 1 and {MAX_TOP_K}"),
            );
        }
    }

    let kind = match req
        .kind
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .map(str::parse::<KnowledgeType>)
        .transpose()
    {
        Ok(kind) => kind,
        Err(e) => return ApiResponse::error(ErrorCode::InvalidRequest, e),
    };

    let queries: Vec<&str> = req
        .queries
        .iter()
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .collect();
    let category = req.category.as_deref().map(str::trim).filter(|c| !c.is_empty());

    if queries.is_empty() && category.is_none() && req.query.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Query cannot be empty");
    }

    let start = Instant::now();
    let results = match run_search(&state, &req, &queries, category, kind).await {
        Ok(results) => results,
        Err(e) => return e.into(),
    };

    ApiResponse::success(SearchResponse {
        confidence: confidence(&results),
        total: results.len(),
        results: results.into_iter().map(Into::into).collect(),
        timing_ms: start.elapsed().as_millis() as u64,
    })
}

async fn run_search(
    state: &AppState,
    req: &SearchRequest,
    queries: &[&str],
    category: Option<&str>,
    kind: Option<KnowledgeType>,
) -> Result<Vec<RetrievedDocument>> {
    if !queries.is_empty() {
        let per_query = req.top_k.unwrap_or(MULTI_QUERY_TOP_K);
        return state.retriever.retrieve_multi(queries, per_query).await;
    }
    if let Some(category) = category {
        let limit = req.top_k.unwrap_or(CATEGORY_LIMIT);
        return state.retriever.retrieve_by_category(category, limit).await;
    }
    state
        .retriever
        .retrieve(
            &req.query,
            req.top_k.unwrap_or(DEFAULT_TOP_K),
            kind,
            req.state.as_deref(),
        )
        .await
}
