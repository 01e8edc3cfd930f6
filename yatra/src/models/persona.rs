use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FALLBACK_PERSONA_ID: &str = "pers001";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersonaDefinition {
    /// Guide used when the catalog has no personas at all.
    pub fn builtin() -> Self {
        Self {
            id: FALLBACK_PERSONA_ID.to_string(),
            name: "Ravi".to_string(),
            system_prompt: "You are a helpful travel guide for India.".to_string(),
            category: None,
            description: None,
            quick_version: None,
            extra: Map::new(),
        }
    }
}
