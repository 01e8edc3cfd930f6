use serde::{Deserialize, Serialize};

use super::conversation::ChatMessage;

/// Everything the generator receives for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub user_query: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub answer: String,
    pub model: String,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}
