use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::{Result, YatraError};
use crate::models::ConversationTurn;

pub const DEFAULT_CONVERSATION_TITLE: &str = "New Travel Chat";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted conversation turns, oldest first.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create(&self, title: Option<String>) -> Result<Conversation>;

    async fn get(&self, conversation_id: &str) -> Result<Option<Conversation>>;

    async fn append(&self, conversation_id: &str, turn: ConversationTurn) -> Result<()>;

    /// The last `limit` turns, oldest first.
    async fn recent_turns(&self, conversation_id: &str, limit: usize)
        -> Result<Vec<ConversationTurn>>;

    async fn turns(&self, conversation_id: &str) -> Result<Vec<ConversationTurn>>;
}

struct Thread {
    conversation: Conversation,
    turns: Vec<ConversationTurn>,
}

#[derive(Default)]
pub struct InMemoryConversationStore {
    threads: RwLock<HashMap<String, Thread>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(conversation_id: &str) -> YatraError {
    YatraError::NotFound(format!("Conversation {conversation_id} not found"))
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self, title: Option<String>) -> Result<Conversation> {
        let now = Utc::now();
        let conversation = Conversation {
            id: nanoid!(),
            title: title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_CONVERSATION_TITLE.to_string()),
            created_at: now,
            updated_at: now,
        };

        self.threads.write().await.insert(
            conversation.id.clone(),
            Thread {
                conversation: conversation.clone(),
                turns: Vec::new(),
            },
        );
        Ok(conversation)
    }

    async fn get(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        Ok(self
            .threads
            .read()
            .await
            .get(conversation_id)
            .map(|t| t.conversation.clone()))
    }

    async fn append(&self, conversation_id: &str, turn: ConversationTurn) -> Result<()> {
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(conversation_id)
            .ok_or_else(|| missing(conversation_id))?;
        thread.conversation.updated_at = turn.timestamp;
        thread.turns.push(turn);
        Ok(())
    }

    async fn recent_turns(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>> {
        let threads = self.threads.read().await;
        let turns = &threads
            .get(conversation_id)
            .ok_or_else(|| missing(conversation_id))?
            .turns;
        let start = turns.len().saturating_sub(limit);
        Ok(turns[start..].to_vec())
    }

    async fn turns(&self, conversation_id: &str) -> Result<Vec<ConversationTurn>> {
        self.recent_turns(conversation_id, usize::MAX).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    #[tokio::test]
    async fn recent_turns_are_oldest_first() {
        let store = InMemoryConversationStore::new();
        let conversation = store.create(None).await.unwrap();
        assert_eq!(conversation.title, DEFAULT_CONVERSATION_TITLE);

        for i in 0..4 {
            store
                .append(&conversation.id, ConversationTurn::user(format!("m{i}"), Language::En))
                .await
                .unwrap();
        }

        let recent = store.recent_turns(&conversation.id, 2).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3"]);
        assert_eq!(store.turns(&conversation.id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let store = InMemoryConversationStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
        let err = store
            .append("nope", ConversationTurn::assistant("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, YatraError::NotFound(_)));
    }
}
