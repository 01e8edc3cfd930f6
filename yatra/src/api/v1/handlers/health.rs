use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;
use crate::llm::LlmBackend;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub index: IndexStatus,
    pub embeddings: EmbeddingsStatus,
    pub llm: LlmStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct IndexStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct EmbeddingsStatus {
    pub status: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LlmStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `GET /api/v1/health`
///
/// Always 200. An unreachable index or missing LLM only degrades `status`.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let index_status = match state.index.stats().await {
        Ok(stats) => IndexStatus {
            status: "ok".to_string(),
            name: Some(stats.name),
            count: Some(stats.count),
            endpoint: Some(stats.endpoint),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Vector index health check failed");
            IndexStatus {
                status: "error".to_string(),
                name: None,
                count: None,
                endpoint: None,
            }
        }
    };

    let llm_status = match state.llm.backend() {
        LlmBackend::Unavailable { reason } => LlmStatus {
            status: "unavailable".to_string(),
            provider: None,
            model: None,
            reason: Some(reason.clone()),
        },
        backend => {
            let provider = match backend {
                LlmBackend::OpenAI => "openai",
                LlmBackend::OpenRouter => "openrouter",
                LlmBackend::Ollama => "ollama",
                LlmBackend::LmStudio => "lmstudio",
                _ => "openai-compatible",
            };
            LlmStatus {
                status: "available".to_string(),
                provider: Some(provider.to_string()),
                model: state.llm.model().map(str::to_string),
                reason: None,
            }
        }
    };

    let degraded = index_status.status != "ok" || llm_status.status != "available";

    ApiResponse::success(HealthData {
        status: if degraded { "degraded" } else { "ok" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        index: index_status,
        embeddings: EmbeddingsStatus {
            status: "ok".to_string(),
            model: state.embedding_model.clone(),
        },
        llm: llm_status,
    })
}
