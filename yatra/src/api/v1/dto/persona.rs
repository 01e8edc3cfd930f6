//! Persona DTOs for the v1 API.

use serde::Serialize;

use crate::models::PersonaDefinition;

/// Public view of a guide persona. The system prompt stays server-side.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonaResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
}

impl From<&PersonaDefinition> for PersonaResponse {
    fn from(persona: &PersonaDefinition) -> Self {
        Self {
            id: persona.id.clone(),
            name: persona.name.clone(),
            category: persona.category.clone(),
            description: persona.description.clone(),
            quick_version: persona.quick_version.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPersonasResponse {
    pub personas: Vec<PersonaResponse>,
    pub default_persona_id: String,
}
