use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, YatraError};
use crate::models::{KnowledgeRecord, KnowledgeType};

/// Where a category lives on disk: `<data_dir>/<file>` with the records under
/// the top-level `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySource {
    pub file: &'static str,
    pub key: &'static str,
}

pub fn source_for(kind: KnowledgeType) -> CategorySource {
    let (file, key) = match kind {
        KnowledgeType::SpiritualSite => ("spiritualSites.json", "sites"),
        KnowledgeType::Trek => ("treks.json", "treks"),
        KnowledgeType::Cuisine => ("cuisines.json", "cuisines"),
        KnowledgeType::Festival => ("festivals.json", "festivals"),
        KnowledgeType::Emergency => ("emergencyInfo.json", "emergencies"),
        KnowledgeType::EcoTip => ("ecoTips.json", "tips"),
        KnowledgeType::Wellness => ("wellness.json", "routines"),
        KnowledgeType::Homestay => ("homestays.json", "homestays"),
        KnowledgeType::Shloka => ("shlokas.json", "shlokas"),
        KnowledgeType::Persona => ("personas.json", "personas"),
        KnowledgeType::CrowdPattern => ("crowdPatterns.json", "patterns"),
    };
    CategorySource { file, key }
}

/// Read-only access to the curated catalog.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn load(&self, kind: KnowledgeType) -> Result<Vec<KnowledgeRecord>>;
}

/// Catalog backed by the JSON files in a data directory.
#[derive(Debug, Clone)]
pub struct FileContentStore {
    data_dir: PathBuf,
}

impl FileContentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Raw JSON entries of one category file.
///
/// A file without the collection key (or with `null` there) yields no
/// entries. A missing or unreadable file is an error.
pub(crate) async fn read_collection(data_dir: &Path, kind: KnowledgeType) -> Result<Vec<Value>> {
    let source = source_for(kind);
    let path = data_dir.join(source.file);

    let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
        YatraError::Content(format!("Failed to read {}: {e}", path.display()))
    })?;
    let mut document: Value = serde_json::from_str(&raw).map_err(|e| {
        YatraError::Content(format!("Invalid JSON in {}: {e}", path.display()))
    })?;

    match document.get_mut(source.key).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(YatraError::Content(format!(
            "Expected an array under '{}' in {}",
            source.key,
            path.display()
        ))),
    }
}

#[async_trait]
impl ContentStore for FileContentStore {
    async fn load(&self, kind: KnowledgeType) -> Result<Vec<KnowledgeRecord>> {
        let items = read_collection(&self.data_dir, kind).await?;

        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                KnowledgeRecord::from_value(kind, item).map_err(|e| {
                    YatraError::Content(format!("{kind} entry #{idx} is malformed: {e}"))
                })
            })
            .collect()
    }
}

/// Catalog held in memory. Categories never inserted load as empty.
#[derive(Debug, Clone, Default)]
pub struct StaticContentStore {
    records: HashMap<KnowledgeType, Vec<KnowledgeRecord>>,
}

impl StaticContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: KnowledgeType, records: Vec<KnowledgeRecord>) -> Self {
        self.records.insert(kind, records);
        self
    }
}

#[async_trait]
impl ContentStore for StaticContentStore {
    async fn load(&self, kind: KnowledgeType) -> Result<Vec<KnowledgeRecord>> {
        Ok(self.records.get(&kind).cloned().unwrap_or_default())
    }
}
