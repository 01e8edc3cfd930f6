use std::sync::Arc;

use serde::Serialize;

use crate::error::{Result, YatraError};
use crate::knowledge::PersonaStore;
use crate::llm::TextGenerator;
use crate::models::{ConversationTurn, Language, RetrievedDocument, TokenUsage};
use crate::rag::{compose, confidence, detect_language, select_persona, Retriever, DEFAULT_TOP_K};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Received,
    Retrieving,
    Scoring,
    Composing,
    Generating,
    Completed,
    Failed,
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Retrieving => "retrieving",
            Self::Scoring => "scoring",
            Self::Composing => "composing",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Caller choices for one turn. Unset fields are inferred from the query.
#[derive(Debug, Clone, Default)]
pub struct TurnOptions {
    pub language: Option<Language>,
    pub persona_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub answer: String,
    pub source_ids: Vec<String>,
    pub sources: Vec<RetrievedDocument>,
    pub confidence: f32,
    pub language: Language,
    pub persona_id: String,
    pub persona_name: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Runs one question through retrieval, scoring, prompt composition and
/// generation.
#[derive(Clone)]
pub struct DialogueOrchestrator {
    retriever: Retriever,
    generator: Arc<dyn TextGenerator>,
    personas: Arc<PersonaStore>,
    top_k: usize,
}

impl DialogueOrchestrator {
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn TextGenerator>,
        personas: Arc<PersonaStore>,
    ) -> Self {
        Self {
            retriever,
            generator,
            personas,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn personas(&self) -> &PersonaStore {
        &self.personas
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Answer `query`. `history` holds earlier turns only, oldest first.
    ///
    /// An empty query is rejected as an input error. Any later failure is
    /// logged and reported as [`YatraError::ProcessingFailed`].
    pub async fn run_turn(
        &self,
        query: &str,
        options: &TurnOptions,
        history: &[ConversationTurn],
    ) -> Result<TurnOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(YatraError::Validation("Message cannot be empty".to_string()));
        }

        let mut state = TurnState::Received;
        match self.advance(&mut state, query, options, history).await {
            Ok(outcome) => {
                transition(&mut state, TurnState::Completed);
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(state = %state, error = %e, "Dialogue turn failed");
                transition(&mut state, TurnState::Failed);
                Err(YatraError::ProcessingFailed)
            }
        }
    }

    async fn advance(
        &self,
        state: &mut TurnState,
        query: &str,
        options: &TurnOptions,
        history: &[ConversationTurn],
    ) -> Result<TurnOutcome> {
        let language = options.language.unwrap_or_else(|| detect_language(query));
        let persona_id = options
            .persona_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| select_persona(query));
        let persona = self.personas.resolve(Some(persona_id));

        transition(state, TurnState::Retrieving);
        let documents = self.retriever.retrieve(query, self.top_k, None, None).await?;

        transition(state, TurnState::Scoring);
        let confidence = confidence(&documents);

        transition(state, TurnState::Composing);
        let request = compose(&persona, &documents, language, history, query);

        transition(state, TurnState::Generating);
        let generated = self.generator.generate(&request).await?;

        Ok(TurnOutcome {
            answer: generated.answer,
            source_ids: documents.iter().map(|d| d.id.clone()).collect(),
            sources: documents,
            confidence,
            language,
            persona_id: persona.id,
            persona_name: persona.name,
            model: generated.model,
            usage: generated.usage,
        })
    }
}

fn transition(state: &mut TurnState, next: TurnState) {
    tracing::debug!(from = %state, to = %next, "Turn state change");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::EmbeddingProvider;
    use crate::models::{GenerationRequest, GenerationResult, PersonaDefinition};
    use crate::vector::{InMemoryIndex, SharedIndex};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<GenerationRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for Recorder {
        async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(YatraError::Llm("upstream exploded: secret-key-123".to_string()));
            }
            Ok(GenerationResult {
                answer: "Go in May or June.".to_string(),
                model: "test-model".to_string(),
                usage: None,
            })
        }
    }

    fn personas() -> Arc<PersonaStore> {
        let trek_guide = PersonaDefinition {
            id: "pers003".to_string(),
            name: "Arjun".to_string(),
            system_prompt: "You are Arjun, a trek companion.".to_string(),
            ..PersonaDefinition::builtin()
        };
        Arc::new(PersonaStore::new(
            vec![PersonaDefinition::builtin(), trek_guide],
            "pers001",
        ))
    }

    fn orchestrator(generator: Arc<Recorder>) -> DialogueOrchestrator {
        let index = SharedIndex::new(Arc::new(InMemoryIndex::new("test")));
        let retriever = Retriever::new(Arc::new(EmbeddingProvider::mock(8)), index);
        DialogueOrchestrator::new(retriever, generator, personas())
    }

    #[tokio::test]
    async fn empty_index_completes_with_baseline_confidence() {
        let generator = Arc::new(Recorder::default());
        let outcome = orchestrator(generator.clone())
            .run_turn("Which trek suits beginners?", &TurnOptions::default(), &[])
            .await
            .unwrap();

        assert_eq!(outcome.confidence, 0.3);
        assert!(outcome.source_ids.is_empty());
        assert_eq!(outcome.persona_id, "pers003");
        assert_eq!(outcome.persona_name, "Arjun");
        assert_eq!(outcome.language, Language::En);

        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].system_prompt.starts_with("You are Arjun"));
    }

    #[tokio::test]
    async fn unknown_persona_falls_back_to_default() {
        let generator = Arc::new(Recorder::default());
        let options = TurnOptions {
            language: Some(Language::Hi),
            persona_id: Some("pers999".to_string()),
        };
        let outcome = orchestrator(generator)
            .run_turn("hello", &options, &[])
            .await
            .unwrap();
        assert_eq!(outcome.persona_id, "pers001");
        assert_eq!(outcome.language, Language::Hi);
    }

    #[tokio::test]
    async fn generation_failure_is_opaque() {
        let generator = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let err = orchestrator(generator)
            .run_turn("hello", &TurnOptions::default(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, YatraError::ProcessingFailed));
        assert_eq!(err.to_string(), "Failed to process message");
    }

    #[tokio::test]
    async fn blank_query_never_reaches_generator() {
        let generator = Arc::new(Recorder::default());
        let err = orchestrator(generator.clone())
            .run_turn("   ", &TurnOptions::default(), &[])
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(generator.requests.lock().unwrap().is_empty());
    }
}
