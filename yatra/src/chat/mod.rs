mod history;
mod orchestrator;
mod service;

pub use history::{Conversation, ConversationStore, InMemoryConversationStore, DEFAULT_CONVERSATION_TITLE};
pub use orchestrator::{DialogueOrchestrator, TurnOptions, TurnOutcome, TurnState};
pub use service::ChatService;
