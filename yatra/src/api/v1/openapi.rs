use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Yatra API",
        version = "1.0.0",
        description = "Travel guide for India. Retrieval-augmented answers in English and Hindi.",
    ),
    paths(
        handlers::health::health_check,
        handlers::conversation::create_conversation,
        handlers::conversation::send_message,
        handlers::conversation::list_messages,
        handlers::search::search,
        handlers::persona::list_personas,
        handlers::persona::get_persona,
        handlers::admin::index_stats,
        handlers::admin::rebuild_index,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Conversations
        dto::conversation::CreateConversationRequest,
        dto::conversation::ConversationResponse,
        dto::conversation::SendMessageRequest,
        dto::conversation::SendMessageResponse,
        dto::conversation::TokenUsageResponse,
        dto::conversation::MessageResponse,
        dto::conversation::ListMessagesResponse,
        // Search
        dto::search::SearchRequest,
        dto::search::SearchResponse,
        dto::search::DocumentHit,
        // Personas
        dto::persona::PersonaResponse,
        dto::persona::ListPersonasResponse,
        // Admin
        dto::admin::IndexStatsResponse,
        dto::admin::CategoryCountResponse,
        dto::admin::RebuildIndexResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::IndexStatus,
        handlers::health::EmbeddingsStatus,
        handlers::health::LlmStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "conversations", description = "Conversations and dialogue turns"),
        (name = "search", description = "Knowledge retrieval without generation"),
        (name = "personas", description = "Guide personas"),
        (name = "admin", description = "Index maintenance (auth required)"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
