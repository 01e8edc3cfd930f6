use crate::models::{
    ConversationTurn, GenerationRequest, Language, PersonaDefinition, RetrievedDocument,
};

/// Most recent turns passed to the generator.
pub const HISTORY_WINDOW: usize = 5;

pub const NO_CONTEXT_NOTICE: &str =
    "No specific context retrieved. Use your general knowledge about India travel.";

const CONTEXT_HEADER: &str = "RETRIEVED KNOWLEDGE CONTEXT:";
const MISTAKES_HEADER: &str = "COMMON MISTAKES TO AVOID:";

const GUIDELINES: &str = "IMPORTANT GUIDELINES:
- Use the retrieved context below to provide accurate, specific information
- If information is from context, cite sources using [source_id]
- If unsure or no relevant context, admit it honestly
- Provide actionable advice with specific details (costs, timings, locations)
- Highlight \"avoid_common_mistake\" tips when relevant
- Be conversational and helpful, matching the persona's tone";

pub fn language_directive(language: Language) -> &'static str {
    match language {
        Language::Hi => "Respond primarily in Hindi (Devanagari script) but include English for proper nouns and technical terms.",
        Language::En => "Respond in English.",
    }
}

/// Assemble the generator input for one turn.
///
/// `history` holds earlier turns oldest-first and must not include `query`.
/// Only the last [`HISTORY_WINDOW`] of them are kept, reduced to role and
/// content.
pub fn compose(
    persona: &PersonaDefinition,
    documents: &[RetrievedDocument],
    language: Language,
    history: &[ConversationTurn],
    query: &str,
) -> GenerationRequest {
    let start = history.len().saturating_sub(HISTORY_WINDOW);

    GenerationRequest {
        system_prompt: system_prompt(persona, documents, language),
        history: history[start..]
            .iter()
            .map(ConversationTurn::to_message)
            .collect(),
        user_query: query.to_string(),
    }
}

fn system_prompt(
    persona: &PersonaDefinition,
    documents: &[RetrievedDocument],
    language: Language,
) -> String {
    let mut prompt = format!(
        "{}\n\n{}\n\n{GUIDELINES}\n\n",
        persona.system_prompt,
        language_directive(language)
    );

    if documents.is_empty() {
        prompt.push_str(NO_CONTEXT_NOTICE);
        prompt.push('\n');
        return prompt;
    }

    prompt.push_str(CONTEXT_HEADER);
    prompt.push('\n');
    for doc in documents {
        let content = serde_json::to_string_pretty(&doc.content)
            .unwrap_or_else(|_| doc.content.raw().to_string());
        prompt.push_str(&format!(
            "\n[{}] {}:\n{content}\n",
            doc.id,
            doc.category_label()
        ));
    }

    let mistakes: Vec<(&str, &str)> = documents
        .iter()
        .filter_map(|doc| Some((doc.id.as_str(), doc.content.avoid_common_mistake()?)))
        .collect();
    if !mistakes.is_empty() {
        prompt.push_str(&format!("\n{MISTAKES_HEADER}\n"));
        for (id, tip) in mistakes {
            prompt.push_str(&format!("- [{id}] {tip}\n"));
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentMetadata, KnowledgeRecord, KnowledgeType, Role};
    use serde_json::json;

    fn persona() -> PersonaDefinition {
        PersonaDefinition {
            system_prompt: "You are Ravi, a friendly local guide.".to_string(),
            ..PersonaDefinition::builtin()
        }
    }

    fn doc(id: &str, value: serde_json::Value) -> RetrievedDocument {
        let content = KnowledgeRecord::from_value(KnowledgeType::SpiritualSite, value).unwrap();
        RetrievedDocument {
            id: id.to_string(),
            metadata: DocumentMetadata {
                kind: "spiritual_site".to_string(),
                category: "jyotirlinga".to_string(),
                state: Some("Uttarakhand".to_string()),
                name: "Kedarnath".to_string(),
                difficulty: None,
                content: content.raw().to_string(),
            },
            content,
            distance: 0.1,
            score: 0.9,
        }
    }

    #[test]
    fn no_documents_discloses_missing_context() {
        let request = compose(&persona(), &[], Language::En, &[], "Best time for Kedarnath?");

        assert!(request.system_prompt.contains(NO_CONTEXT_NOTICE));
        assert!(!request.system_prompt.contains("RETRIEVED KNOWLEDGE"));
        assert!(request.system_prompt.starts_with("You are Ravi"));
        assert!(request.system_prompt.contains("Respond in English."));
        assert_eq!(request.user_query, "Best time for Kedarnath?");
    }

    #[test]
    fn lists_documents_with_id_and_category() {
        let docs = [doc(
            "ss001",
            json!({
                "id": "ss001",
                "name": "Kedarnath",
                "avoid_common_mistake": "Do not skip acclimatization at Gaurikund."
            }),
        )];
        let request = compose(&persona(), &docs, Language::Hi, &[], "Kedarnath kab jaye?");
        let prompt = &request.system_prompt;

        assert!(prompt.contains("RETRIEVED KNOWLEDGE CONTEXT:\n\n[ss001] jyotirlinga:\n{"));
        assert!(prompt.contains("\"name\": \"Kedarnath\""));
        assert!(prompt.contains("Devanagari"));
        assert!(prompt.contains("COMMON MISTAKES TO AVOID:\n- [ss001] Do not skip acclimatization"));
        assert!(!prompt.contains(NO_CONTEXT_NOTICE));
    }

    #[test]
    fn history_is_windowed_and_stripped() {
        let history: Vec<ConversationTurn> = (0..7)
            .map(|i| {
                let mut turn = if i % 2 == 0 {
                    ConversationTurn::user(format!("q{i}"), Language::En)
                } else {
                    ConversationTurn::assistant(format!("a{i}"))
                };
                turn.sources = vec!["ss001".to_string()];
                turn.confidence = Some(0.8);
                turn
            })
            .collect();

        let request = compose(&persona(), &[], Language::En, &history, "next");
        let contents: Vec<_> = request.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q2", "a3", "q4", "a5", "q6"]);
        assert_eq!(request.history[1].role, Role::Assistant);

        let serialized = serde_json::to_value(&request.history).unwrap();
        assert_eq!(serialized[0], json!({"role": "user", "content": "q2"}));
    }
}
