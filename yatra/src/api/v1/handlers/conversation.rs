//! v1 Conversation handlers.

use axum::body::Bytes;
use axum::extract::{Path, State};

use crate::api::v1::dto::{
    ConversationResponse, CreateConversationRequest, ListMessagesResponse, SendMessageRequest,
    SendMessageResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::chat::TurnOptions;
use crate::models::Language;

/// `POST /api/v1/conversations`
#[utoipa::path(
    post,
    path = "/api/v1/conversations",
    tag = "conversations",
    request_body(content = CreateConversationRequest, description = "Optional"),
    responses(
        (status = 201, description = "Conversation created", body = ConversationResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn create_conversation(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResponse<ConversationResponse> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        CreateConversationRequest::default()
    } else {
        match serde_json::from_slice::<CreateConversationRequest>(&body) {
            Ok(req) => req,
            Err(e) => return ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}")),
        }
    };

    match state.chat.store().create(req.title).await {
        Ok(conversation) => ApiResponse::created(conversation.into()),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/conversations/{conversationId}/messages`
///
/// Runs one dialogue turn. The user's message is stored even when the turn
/// fails.
#[utoipa::path(
    post,
    path = "/api/v1/conversations/{conversationId}/messages",
    tag = "conversations",
    params(("conversationId" = String, Path, description = "Conversation ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Assistant reply", body = SendMessageResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Conversation not found", body = ApiError),
        (status = 500, description = "Failed to process message", body = ApiError),
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    axum::Json(req): axum::Json<SendMessageRequest>,
) -> ApiResponse<SendMessageResponse> {
    if req.message.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Message cannot be empty");
    }

    let language = match req.language.as_deref().map(str::parse::<Language>).transpose() {
        Ok(language) => language,
        Err(e) => return ApiResponse::error(ErrorCode::InvalidRequest, e),
    };

    let options = TurnOptions {
        language,
        persona_id: req.persona_id,
    };

    match state
        .chat
        .send_message(&conversation_id, &req.message, options)
        .await
    {
        Ok(outcome) => ApiResponse::success(SendMessageResponse::new(conversation_id, outcome)),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/conversations/{conversationId}/messages`
#[utoipa::path(
    get,
    path = "/api/v1/conversations/{conversationId}/messages",
    tag = "conversations",
    params(("conversationId" = String, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Stored turns, oldest first", body = ListMessagesResponse),
        (status = 404, description = "Conversation not found", body = ApiError),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> ApiResponse<ListMessagesResponse> {
    match state.chat.store().turns(&conversation_id).await {
        Ok(turns) => ApiResponse::success(ListMessagesResponse {
            conversation_id,
            messages: turns.into_iter().map(Into::into).collect(),
        }),
        Err(e) => e.into(),
    }
}
