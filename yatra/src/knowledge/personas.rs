use std::path::Path;

use crate::error::{Result, YatraError};
use crate::models::{KnowledgeType, PersonaDefinition};

use super::content::read_collection;

/// Guide personas, looked up by id.
///
/// `get` reports a miss as `None`. Callers that need a persona regardless use
/// `resolve`, which maps the miss to `default_persona` explicitly.
#[derive(Debug, Clone)]
pub struct PersonaStore {
    personas: Vec<PersonaDefinition>,
    default_id: String,
}

impl PersonaStore {
    pub fn new(personas: Vec<PersonaDefinition>, default_id: impl Into<String>) -> Self {
        Self {
            personas,
            default_id: default_id.into(),
        }
    }

    /// Load `personas.json` from the data directory.
    pub async fn load(data_dir: &Path, default_id: impl Into<String>) -> Result<Self> {
        let items = read_collection(data_dir, KnowledgeType::Persona).await?;

        let personas = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                serde_json::from_value::<PersonaDefinition>(item).map_err(|e| {
                    YatraError::Content(format!("persona entry #{idx} is malformed: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = personas.len(), "Loaded personas");
        Ok(Self::new(personas, default_id))
    }

    pub fn get(&self, id: &str) -> Option<&PersonaDefinition> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// The configured default, else the first persona, else the built-in guide.
    pub fn default_persona(&self) -> PersonaDefinition {
        self.get(&self.default_id)
            .or_else(|| self.personas.first())
            .cloned()
            .unwrap_or_else(PersonaDefinition::builtin)
    }

    pub fn resolve(&self, id: Option<&str>) -> PersonaDefinition {
        match id {
            Some(id) => match self.get(id) {
                Some(persona) => persona.clone(),
                None => {
                    tracing::debug!(persona_id = id, "Unknown persona, using default");
                    self.default_persona()
                }
            },
            None => self.default_persona(),
        }
    }

    pub fn list(&self) -> &[PersonaDefinition] {
        &self.personas
    }
}
