mod confidence;
mod prompt;
mod query;
mod retriever;

pub use confidence::{confidence, confidence_from_scores, NO_CONTEXT_CONFIDENCE};
pub use prompt::{compose, language_directive, HISTORY_WINDOW, NO_CONTEXT_NOTICE};
pub use query::{detect_language, extract_intents, extract_location, extract_month, select_persona, Intent};
pub use retriever::{
    score_from_distance, Retriever, CATEGORY_LIMIT, DEFAULT_TOP_K, MULTI_QUERY_LIMIT,
    MULTI_QUERY_TOP_K,
};
