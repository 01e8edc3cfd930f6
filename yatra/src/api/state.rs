use std::sync::Arc;

use crate::chat::{ChatService, ConversationStore, DialogueOrchestrator};
use crate::config::Config;
use crate::embeddings::TextEmbedder;
use crate::ingest::IngestionPipeline;
use crate::knowledge::{ContentStore, PersonaStore};
use crate::llm::{LlmProvider, TextGenerator};
use crate::rag::Retriever;
use crate::vector::SharedIndex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub index: SharedIndex,
    pub personas: Arc<PersonaStore>,
    pub retriever: Retriever,
    pub chat: ChatService,
    pub ingestion: IngestionPipeline,
    /// Reported by the health check. Answers come from the generator handed
    /// to [`AppState::new`].
    pub llm: LlmProvider,
    pub embedding_model: String,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        content: Arc<dyn ContentStore>,
        embedder: Arc<dyn TextEmbedder>,
        embedding_model: impl Into<String>,
        index: SharedIndex,
        generator: Arc<dyn TextGenerator>,
        llm: LlmProvider,
        personas: PersonaStore,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        let config = Arc::new(config);
        let personas = Arc::new(personas);

        let retriever = Retriever::new(embedder.clone(), index.clone());
        let orchestrator = DialogueOrchestrator::new(retriever.clone(), generator, personas.clone())
            .with_top_k(config.chat.top_k);
        let chat = ChatService::new(orchestrator, conversations)
            .with_history_window(config.chat.history_window);
        let ingestion = IngestionPipeline::new(content, embedder, index.clone());

        Self {
            config,
            index,
            personas,
            retriever,
            chat,
            ingestion,
            llm,
            embedding_model: embedding_model.into(),
        }
    }
}
