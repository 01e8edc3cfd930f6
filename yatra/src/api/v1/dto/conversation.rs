//! Conversation request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::search::DocumentHit;
use crate::chat::{Conversation, TurnOutcome};
use crate::models::{ConversationTurn, TokenUsage};

/// Request body for `POST /v1/conversations`. The body may be omitted.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    /// Defaults to "New Travel Chat".
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: String,
    pub title: String,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            title: conversation.title,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

/// Request body for `POST /v1/conversations/{conversationId}/messages`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub message: String,
    /// Guide to answer as. Picked from the message when absent.
    pub persona_id: Option<String>,
    /// `en` or `hi`. Detected from the message when absent.
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsageResponse {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<TokenUsage> for TokenUsageResponse {
    fn from(usage: TokenUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub conversation_id: String,
    pub answer: String,
    pub persona_id: String,
    pub persona_name: String,
    pub confidence: f32,
    pub language: String,
    pub sources: Vec<DocumentHit>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsageResponse>,
}

impl SendMessageResponse {
    pub fn new(conversation_id: String, outcome: TurnOutcome) -> Self {
        Self {
            conversation_id,
            answer: outcome.answer,
            persona_id: outcome.persona_id,
            persona_name: outcome.persona_name,
            confidence: outcome.confidence,
            language: outcome.language.to_string(),
            sources: outcome.sources.into_iter().map(Into::into).collect(),
            model: outcome.model,
            usage: outcome.usage.map(Into::into),
        }
    }
}

/// A stored turn as returned by the history endpoint.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub role: String,
    pub content: String,
    #[schema(value_type = String)]
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    /// Ids of the documents the answer drew on.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl From<ConversationTurn> for MessageResponse {
    fn from(turn: ConversationTurn) -> Self {
        Self {
            role: turn.role.to_string(),
            content: turn.content,
            timestamp: turn.timestamp,
            language: turn.language.map(|l| l.to_string()),
            persona_id: turn.persona_id,
            sources: turn.sources,
            confidence: turn.confidence,
            model: turn.model,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesResponse {
    pub conversation_id: String,
    pub messages: Vec<MessageResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    #[test]
    fn send_message_request_deserializes_minimal() {
        let req: SendMessageRequest =
            serde_json::from_str(r#"{"message":"Best time for Kedarnath?"}"#).expect("deserialize");
        assert_eq!(req.message, "Best time for Kedarnath?");
        assert!(req.persona_id.is_none());
        assert!(req.language.is_none());
    }

    #[test]
    fn send_message_request_with_overrides() {
        let json = r#"{"message":"namaste","personaId":"pers002","language":"hi"}"#;
        let req: SendMessageRequest = serde_json::from_str(json).expect("deserialize");
        assert_eq!(req.persona_id.as_deref(), Some("pers002"));
        assert_eq!(req.language.as_deref(), Some("hi"));
    }

    #[test]
    fn user_turn_omits_assistant_fields() {
        let turn = ConversationTurn::user("hello", Language::Hi);
        let json = serde_json::to_value(MessageResponse::from(turn)).expect("serialize");
        assert_eq!(json["role"], "user");
        assert_eq!(json["language"], "hi");
        assert!(json.get("personaId").is_none());
        assert!(json.get("sources").is_none());
        assert!(json.get("confidence").is_none());
    }
}
