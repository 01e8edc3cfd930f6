use serde_json::Value;

use crate::error::{Result, YatraError};
use crate::models::{DocumentMetadata, EmbeddableDocument, KnowledgeRecord};

/// Upper bound on normalized text, in characters.
pub const MAX_EMBEDDING_CHARS: usize = 8000;

fn text(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

fn text_or<'a>(field: &'a Option<String>, default: &'a str) -> &'a str {
    match field.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => default,
    }
}

/// Render a loosely typed catalog value the way it reads in prose.
fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn value_or(field: &Option<Value>, default: &str) -> String {
    match field.as_ref().map(render) {
        Some(rendered) if !rendered.is_empty() => rendered,
        _ => default.to_string(),
    }
}

fn list_or(field: &Option<Vec<String>>, default: &str) -> String {
    match field {
        Some(items) if !items.is_empty() => items.join(", "),
        _ => default.to_string(),
    }
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text,
    }
}

/// Flatten a record into the prose sentence that gets embedded.
pub fn normalize(record: &KnowledgeRecord) -> String {
    let text = match record {
        KnowledgeRecord::SpiritualSite(r) => format!(
            "{} in {}. {} {} {} Best season: {}",
            text(&r.name),
            text(&r.state),
            text(&r.quick_version),
            text(&r.description),
            text(&r.mythological_significance),
            value_or(&r.best_season, "N/A"),
        ),
        KnowledgeRecord::Trek(r) => format!(
            "{} trek in {}. Difficulty: {}. {} {} Best season: {}",
            text(&r.name),
            text(&r.state),
            text(&r.difficulty),
            text(&r.quick_version),
            text(&r.description),
            value_or(&r.best_season, "N/A"),
        ),
        KnowledgeRecord::Cuisine(r) => format!(
            "{} from {}. {} {} Best season: {}",
            text(&r.dish_name),
            text(&r.state),
            text(&r.quick_version),
            text(&r.description),
            value_or(&r.when_to_try, "Year-round"),
        ),
        KnowledgeRecord::Festival(r) => format!(
            "{} festival. {} {} {} Celebrated in: {}",
            text(&r.name),
            text(&r.quick_version),
            text(&r.description),
            text(&r.mythological_background),
            list_or(&r.states_celebrated, "Various locations"),
        ),
        KnowledgeRecord::Emergency(r) => format!(
            "Emergency: {}. {} {} Prevention: {}",
            text(&r.category),
            text(&r.quick_version),
            text(&r.description),
            value_or(&r.prevention_tips, "N/A"),
        ),
        KnowledgeRecord::EcoTip(r) => format!(
            "Eco tip: {}. {} {} {}",
            text(&r.context),
            text(&r.quick_version),
            text(&r.tip),
            text(&r.explanation),
        ),
        KnowledgeRecord::Wellness(r) => format!(
            "{} - {}. {} Target mood: {} Duration: {} minutes",
            text(&r.name),
            text(&r.routine_type),
            text(&r.quick_version),
            value_or(&r.target_mood, "N/A"),
            value_or(&r.duration_minutes, "N/A"),
        ),
        KnowledgeRecord::Homestay(r) => format!(
            "{} homestay in {}. {} {} Price: {}",
            text(&r.name),
            text(&r.state),
            text(&r.quick_version),
            text(&r.description),
            value_or(&r.price_range, "N/A"),
        ),
        KnowledgeRecord::Shloka(r) => format!(
            "Shloka: {}. {} Usage: {}",
            r.transliteration
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(text(&r.sanskrit)),
            text(&r.meaning_english),
            text_or(&r.use_context, "N/A"),
        ),
        KnowledgeRecord::Persona(r) => format!(
            "Persona: {}. {} {}",
            text(&r.name),
            text(&r.quick_version),
            text(&r.description),
        ),
        KnowledgeRecord::CrowdPattern(r) => format!(
            "Crowd patterns for {} in {}. {} Peak months: {}",
            text(&r.name),
            text(&r.state),
            text(&r.quick_version),
            list_or(&r.peak_months, "N/A"),
        ),
        KnowledgeRecord::Unknown { raw, .. } => raw.to_string(),
    };

    truncate_chars(text, MAX_EMBEDDING_CHARS)
}

/// Normalize a record and attach the metadata the index stores beside it.
pub fn to_embeddable(record: &KnowledgeRecord) -> Result<EmbeddableDocument> {
    let kind = record.kind().ok_or_else(|| {
        YatraError::Content(format!(
            "Cannot index record {} of unknown type {}",
            record.id(),
            record.kind_tag()
        ))
    })?;

    let metadata = DocumentMetadata {
        kind: kind.as_str().to_string(),
        category: record
            .category()
            .filter(|c| !c.is_empty())
            .unwrap_or("general")
            .to_string(),
        state: kind
            .carries_state()
            .then(|| record.state().unwrap_or("Unknown").to_string()),
        name: record.display_name().unwrap_or_default().to_string(),
        difficulty: matches!(record, KnowledgeRecord::Trek(_))
            .then(|| record.difficulty().unwrap_or("Unknown").to_string()),
        content: serde_json::to_string(&record.raw())?,
    };

    Ok(EmbeddableDocument {
        id: record.id().to_string(),
        kind,
        text: normalize(record),
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KnowledgeType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(kind: KnowledgeType, value: Value) -> KnowledgeRecord {
        KnowledgeRecord::from_value(kind, value).unwrap()
    }

    #[test]
    fn spiritual_site_template() {
        let site = record(
            KnowledgeType::SpiritualSite,
            json!({
                "id": "ss001",
                "name": "Kedarnath Temple",
                "state": "Uttarakhand",
                "quick_version": "Jyotirlinga in the Himalayas.",
                "description": "Shiva shrine at 3583 m."
            }),
        );

        assert_eq!(
            normalize(&site),
            "Kedarnath Temple in Uttarakhand. Jyotirlinga in the Himalayas. Shiva shrine at 3583 m.  Best season: N/A"
        );
    }

    #[test]
    fn trek_and_cuisine_defaults() {
        let trek = record(
            KnowledgeType::Trek,
            json!({"id": "t1", "name": "Hampta Pass", "state": "Himachal Pradesh", "difficulty": "Moderate", "quick_version": "Crossover trek.", "best_season": ["June", "July"]}),
        );
        assert_eq!(
            normalize(&trek),
            "Hampta Pass trek in Himachal Pradesh. Difficulty: Moderate. Crossover trek.  Best season: June,July"
        );

        let cuisine = record(
            KnowledgeType::Cuisine,
            json!({"id": "c1", "dish_name": "Appam", "state": "Kerala", "quick_version": "Rice pancake."}),
        );
        assert_eq!(
            normalize(&cuisine),
            "Appam from Kerala. Rice pancake.  Best season: Year-round"
        );
    }

    #[test]
    fn festival_lists_states() {
        let festival = record(
            KnowledgeType::Festival,
            json!({"id": "f1", "name": "Onam", "quick_version": "Harvest festival.", "states_celebrated": ["Kerala", "Tamil Nadu"]}),
        );
        assert!(normalize(&festival).ends_with("Celebrated in: Kerala, Tamil Nadu"));

        let festival = record(KnowledgeType::Festival, json!({"id": "f2", "name": "Holi"}));
        assert!(normalize(&festival).ends_with("Celebrated in: Various locations"));
    }

    #[test]
    fn wellness_and_shloka_templates() {
        let routine = record(
            KnowledgeType::Wellness,
            json!({"id": "w1", "name": "Morning Flow", "routine_type": "yoga", "quick_version": "Gentle start.", "duration_minutes": 20}),
        );
        assert_eq!(
            normalize(&routine),
            "Morning Flow - yoga. Gentle start. Target mood: N/A Duration: 20 minutes"
        );

        let shloka = record(
            KnowledgeType::Shloka,
            json!({"id": "sh1", "sanskrit": "ॐ शान्तिः", "meaning_english": "Peace."}),
        );
        assert_eq!(normalize(&shloka), "Shloka: ॐ शान्तिः. Peace. Usage: N/A");
    }

    #[test]
    fn unknown_records_serialize_as_json() {
        let unknown = KnowledgeRecord::Unknown {
            kind: "monument".to_string(),
            raw: json!({"id": "m1"}),
        };
        assert_eq!(normalize(&unknown), r#"{"id":"m1"}"#);
    }

    #[test]
    fn name_and_state_appear_verbatim() {
        let samples = [
            (KnowledgeType::SpiritualSite, "Kashi Vishwanath", "Uttar Pradesh"),
            (KnowledgeType::Trek, "Roopkund", "Uttarakhand"),
            (KnowledgeType::Homestay, "Hodka Bhunga", "Gujarat"),
            (KnowledgeType::CrowdPattern, "Golden Temple", "Punjab"),
        ];

        for (kind, name, state) in samples {
            let rec = record(kind, json!({"id": "x1", "name": name, "state": state}));
            let normalized = normalize(&rec);
            assert!(normalized.contains(name), "{normalized}");
            assert!(normalized.contains(state), "{normalized}");
        }
    }

    #[test]
    fn long_records_truncate_to_exact_char_count() {
        let site = record(
            KnowledgeType::SpiritualSite,
            json!({"id": "ss9", "name": "Somnath", "state": "Gujarat", "description": "मंदिर ".repeat(3000)}),
        );

        let normalized = normalize(&site);
        assert_eq!(normalized.chars().count(), MAX_EMBEDDING_CHARS);
    }

    #[test]
    fn embeddable_metadata_defaults() {
        let trek = record(KnowledgeType::Trek, json!({"id": "t9", "name": "Chadar"}));
        let doc = to_embeddable(&trek).unwrap();

        assert_eq!(doc.id, "t9");
        assert_eq!(doc.metadata.kind, "trek");
        assert_eq!(doc.metadata.category, "general");
        assert_eq!(doc.metadata.state.as_deref(), Some("Unknown"));
        assert_eq!(doc.metadata.difficulty.as_deref(), Some("Unknown"));
        assert_eq!(
            serde_json::from_str::<Value>(&doc.metadata.content).unwrap(),
            json!({"id": "t9", "name": "Chadar"})
        );

        let routine = record(
            KnowledgeType::Wellness,
            json!({"id": "w2", "name": "Nadi Shodhana", "routine_type": "pranayama"}),
        );
        let doc = to_embeddable(&routine).unwrap();
        assert_eq!(doc.metadata.category, "pranayama");
        assert_eq!(doc.metadata.state, None);
    }

    #[test]
    fn unknown_records_cannot_be_indexed() {
        let unknown = KnowledgeRecord::Unknown {
            kind: "monument".to_string(),
            raw: json!({"id": "m1"}),
        };
        assert!(to_embeddable(&unknown).is_err());
    }
}
