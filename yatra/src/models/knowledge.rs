use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Result, YatraError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeType {
    SpiritualSite,
    Trek,
    Cuisine,
    Festival,
    Emergency,
    EcoTip,
    Wellness,
    Homestay,
    Shloka,
    Persona,
    CrowdPattern,
}

impl KnowledgeType {
    /// Every category, in ingestion order.
    pub const ALL: [KnowledgeType; 11] = [
        Self::SpiritualSite,
        Self::Trek,
        Self::Cuisine,
        Self::Festival,
        Self::Emergency,
        Self::EcoTip,
        Self::Wellness,
        Self::Homestay,
        Self::Shloka,
        Self::Persona,
        Self::CrowdPattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpiritualSite => "spiritual_site",
            Self::Trek => "trek",
            Self::Cuisine => "cuisine",
            Self::Festival => "festival",
            Self::Emergency => "emergency",
            Self::EcoTip => "eco_tip",
            Self::Wellness => "wellness",
            Self::Homestay => "homestay",
            Self::Shloka => "shloka",
            Self::Persona => "persona",
            Self::CrowdPattern => "crowd_pattern",
        }
    }

    /// Whether ingestion records a `state` metadata entry for this category.
    pub fn carries_state(&self) -> bool {
        matches!(
            self,
            Self::SpiritualSite | Self::Trek | Self::Cuisine | Self::Homestay | Self::CrowdPattern
        )
    }
}

impl std::fmt::Display for KnowledgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KnowledgeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spiritual_site" => Ok(Self::SpiritualSite),
            "trek" => Ok(Self::Trek),
            "cuisine" => Ok(Self::Cuisine),
            "festival" => Ok(Self::Festival),
            "emergency" => Ok(Self::Emergency),
            "eco_tip" => Ok(Self::EcoTip),
            "wellness" => Ok(Self::Wellness),
            "homestay" => Ok(Self::Homestay),
            "shloka" => Ok(Self::Shloka),
            "persona" => Ok(Self::Persona),
            "crowd_pattern" => Ok(Self::CrowdPattern),
            _ => Err(format!("Unknown knowledge type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpiritualSite {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mythological_significance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_season: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trek {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_season: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cuisine {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_to_try: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Festival {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mythological_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states_celebrated: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Emergency {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevention_tips: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EcoTip {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellnessRoutine {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routine_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_mood: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Homestay {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shloka {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanskrit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning_english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_context: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A guide persona as it appears in the knowledge catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrowdPattern {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_months: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the curated travel catalog.
///
/// Each category has its own typed variant. Fields the catalog carries but the
/// variant does not name are kept in the variant's `extra` map so the record
/// serializes back to what was loaded. `Unknown` holds records whose category
/// tag is not recognized, or whose JSON does not fit the typed variant.
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeRecord {
    SpiritualSite(SpiritualSite),
    Trek(Trek),
    Cuisine(Cuisine),
    Festival(Festival),
    Emergency(Emergency),
    EcoTip(EcoTip),
    Wellness(WellnessRoutine),
    Homestay(Homestay),
    Shloka(Shloka),
    Persona(PersonaRecord),
    CrowdPattern(CrowdPattern),
    Unknown { kind: String, raw: Value },
}

impl KnowledgeRecord {
    /// Build a typed record from catalog JSON.
    pub fn from_value(kind: KnowledgeType, value: Value) -> Result<Self> {
        let record = match kind {
            KnowledgeType::SpiritualSite => Self::SpiritualSite(serde_json::from_value(value)?),
            KnowledgeType::Trek => Self::Trek(serde_json::from_value(value)?),
            KnowledgeType::Cuisine => Self::Cuisine(serde_json::from_value(value)?),
            KnowledgeType::Festival => Self::Festival(serde_json::from_value(value)?),
            KnowledgeType::Emergency => Self::Emergency(serde_json::from_value(value)?),
            KnowledgeType::EcoTip => Self::EcoTip(serde_json::from_value(value)?),
            KnowledgeType::Wellness => Self::Wellness(serde_json::from_value(value)?),
            KnowledgeType::Homestay => Self::Homestay(serde_json::from_value(value)?),
            KnowledgeType::Shloka => Self::Shloka(serde_json::from_value(value)?),
            KnowledgeType::Persona => Self::Persona(serde_json::from_value(value)?),
            KnowledgeType::CrowdPattern => Self::CrowdPattern(serde_json::from_value(value)?),
        };

        if record.id().trim().is_empty() {
            return Err(YatraError::Content(format!(
                "{kind} record is missing a non-empty id"
            )));
        }

        Ok(record)
    }

    /// Decode a record stored by the index. Never fails: anything that does
    /// not fit a typed variant comes back as `Unknown`.
    pub fn decode(kind_tag: &str, value: Value) -> Self {
        match kind_tag.parse::<KnowledgeType>() {
            Ok(kind) => match Self::from_value(kind, value.clone()) {
                Ok(record) => record,
                Err(e) => {
                    tracing::debug!(kind = kind_tag, error = %e, "Stored record does not fit typed variant");
                    Self::Unknown {
                        kind: kind_tag.to_string(),
                        raw: value,
                    }
                }
            },
            Err(_) => Self::Unknown {
                kind: kind_tag.to_string(),
                raw: value,
            },
        }
    }

    pub fn kind(&self) -> Option<KnowledgeType> {
        let kind = match self {
            Self::SpiritualSite(_) => KnowledgeType::SpiritualSite,
            Self::Trek(_) => KnowledgeType::Trek,
            Self::Cuisine(_) => KnowledgeType::Cuisine,
            Self::Festival(_) => KnowledgeType::Festival,
            Self::Emergency(_) => KnowledgeType::Emergency,
            Self::EcoTip(_) => KnowledgeType::EcoTip,
            Self::Wellness(_) => KnowledgeType::Wellness,
            Self::Homestay(_) => KnowledgeType::Homestay,
            Self::Shloka(_) => KnowledgeType::Shloka,
            Self::Persona(_) => KnowledgeType::Persona,
            Self::CrowdPattern(_) => KnowledgeType::CrowdPattern,
            Self::Unknown { .. } => return None,
        };
        Some(kind)
    }

    pub fn kind_tag(&self) -> &str {
        match self {
            Self::Unknown { kind, .. } => kind,
            other => other.kind().map(|k| k.as_str()).unwrap_or("unknown"),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::SpiritualSite(r) => &r.id,
            Self::Trek(r) => &r.id,
            Self::Cuisine(r) => &r.id,
            Self::Festival(r) => &r.id,
            Self::Emergency(r) => &r.id,
            Self::EcoTip(r) => &r.id,
            Self::Wellness(r) => &r.id,
            Self::Homestay(r) => &r.id,
            Self::Shloka(r) => &r.id,
            Self::Persona(r) => &r.id,
            Self::CrowdPattern(r) => &r.id,
            Self::Unknown { raw, .. } => raw.get("id").and_then(Value::as_str).unwrap_or(""),
        }
    }

    /// Human-readable label stored as the `name` metadata entry.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::SpiritualSite(r) => r.name.as_deref(),
            Self::Trek(r) => r.name.as_deref(),
            Self::Cuisine(r) => r.dish_name.as_deref(),
            Self::Festival(r) => r.name.as_deref(),
            Self::Emergency(r) => r.category.as_deref(),
            Self::EcoTip(r) => r.context.as_deref(),
            Self::Wellness(r) => r.name.as_deref(),
            Self::Homestay(r) => r.name.as_deref(),
            Self::Shloka(r) => r.transliteration.as_deref().or(r.sanskrit.as_deref()),
            Self::Persona(r) => r.name.as_deref(),
            Self::CrowdPattern(r) => r.name.as_deref(),
            Self::Unknown { raw, .. } => raw.get("name").and_then(Value::as_str),
        }
    }

    pub fn state(&self) -> Option<&str> {
        match self {
            Self::SpiritualSite(r) => r.state.as_deref(),
            Self::Trek(r) => r.state.as_deref(),
            Self::Cuisine(r) => r.state.as_deref(),
            Self::Homestay(r) => r.state.as_deref(),
            Self::CrowdPattern(r) => r.state.as_deref(),
            Self::Unknown { raw, .. } => raw.get("state").and_then(Value::as_str),
            _ => None,
        }
    }

    /// The record's own `category` field. Wellness routines use `routine_type`.
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::SpiritualSite(r) => r.category.as_deref(),
            Self::Trek(r) => r.category.as_deref(),
            Self::Cuisine(r) => r.category.as_deref(),
            Self::Festival(r) => r.category.as_deref(),
            Self::Emergency(r) => r.category.as_deref(),
            Self::EcoTip(r) => r.category.as_deref(),
            Self::Wellness(r) => r.routine_type.as_deref(),
            Self::Homestay(r) => r.category.as_deref(),
            Self::Shloka(r) => r.category.as_deref(),
            Self::Persona(r) => r.category.as_deref(),
            Self::CrowdPattern(r) => r.category.as_deref(),
            Self::Unknown { raw, .. } => raw.get("category").and_then(Value::as_str),
        }
    }

    pub fn difficulty(&self) -> Option<&str> {
        match self {
            Self::Trek(r) => r.difficulty.as_deref(),
            _ => None,
        }
    }

    fn extra(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::SpiritualSite(r) => Some(&r.extra),
            Self::Trek(r) => Some(&r.extra),
            Self::Cuisine(r) => Some(&r.extra),
            Self::Festival(r) => Some(&r.extra),
            Self::Emergency(r) => Some(&r.extra),
            Self::EcoTip(r) => Some(&r.extra),
            Self::Wellness(r) => Some(&r.extra),
            Self::Homestay(r) => Some(&r.extra),
            Self::Shloka(r) => Some(&r.extra),
            Self::Persona(r) => Some(&r.extra),
            Self::CrowdPattern(r) => Some(&r.extra),
            Self::Unknown { raw, .. } => raw.as_object(),
        }
    }

    pub fn avoid_common_mistake(&self) -> Option<&str> {
        self.extra()
            .and_then(|extra| extra.get("avoid_common_mistake"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|tip| !tip.is_empty())
    }

    /// The record as JSON, including fields the typed variant does not name.
    pub fn raw(&self) -> Value {
        let value = match self {
            Self::SpiritualSite(r) => serde_json::to_value(r),
            Self::Trek(r) => serde_json::to_value(r),
            Self::Cuisine(r) => serde_json::to_value(r),
            Self::Festival(r) => serde_json::to_value(r),
            Self::Emergency(r) => serde_json::to_value(r),
            Self::EcoTip(r) => serde_json::to_value(r),
            Self::Wellness(r) => serde_json::to_value(r),
            Self::Homestay(r) => serde_json::to_value(r),
            Self::Shloka(r) => serde_json::to_value(r),
            Self::Persona(r) => serde_json::to_value(r),
            Self::CrowdPattern(r) => serde_json::to_value(r),
            Self::Unknown { raw, .. } => return raw.clone(),
        };
        // Plain structs of strings and JSON values always serialize.
        value.unwrap_or(Value::Null)
    }
}

impl Serialize for KnowledgeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw().serialize(serializer)
    }
}
