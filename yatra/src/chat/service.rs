use std::sync::Arc;

use crate::error::{Result, YatraError};
use crate::models::ConversationTurn;
use crate::rag::{detect_language, HISTORY_WINDOW};

use super::history::ConversationStore;
use super::orchestrator::{DialogueOrchestrator, TurnOptions, TurnOutcome};

/// Dialogue turns bound to a stored conversation.
///
/// The user's turn is saved before the pipeline runs and stays saved if it
/// fails. The assistant's turn is saved only on success.
#[derive(Clone)]
pub struct ChatService {
    orchestrator: DialogueOrchestrator,
    store: Arc<dyn ConversationStore>,
    history_window: usize,
}

impl ChatService {
    pub fn new(orchestrator: DialogueOrchestrator, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            orchestrator,
            store,
            history_window: HISTORY_WINDOW,
        }
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window.min(HISTORY_WINDOW);
        self
    }

    pub fn orchestrator(&self) -> &DialogueOrchestrator {
        &self.orchestrator
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
        options: TurnOptions,
    ) -> Result<TurnOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(YatraError::Validation("Message cannot be empty".to_string()));
        }
        if self.store.get(conversation_id).await?.is_none() {
            return Err(YatraError::NotFound(format!(
                "Conversation {conversation_id} not found"
            )));
        }

        let options = TurnOptions {
            language: Some(options.language.unwrap_or_else(|| detect_language(message))),
            ..options
        };

        let history = self
            .store
            .recent_turns(conversation_id, self.history_window)
            .await?;

        self.store
            .append(
                conversation_id,
                ConversationTurn::user(message, options.language.unwrap_or_default()),
            )
            .await?;

        let outcome = self
            .orchestrator
            .run_turn(message, &options, &history)
            .await?;

        let mut reply = ConversationTurn::assistant(outcome.answer.clone());
        reply.language = Some(outcome.language);
        reply.persona_id = Some(outcome.persona_id.clone());
        reply.sources = outcome.source_ids.clone();
        reply.confidence = Some(outcome.confidence);
        reply.model = Some(outcome.model.clone());
        reply.usage = outcome.usage;
        self.store.append(conversation_id, reply).await?;

        tracing::info!(
            conversation_id,
            persona_id = %outcome.persona_id,
            sources = outcome.source_ids.len(),
            confidence = outcome.confidence,
            "Dialogue turn completed"
        );
        Ok(outcome)
    }
}
