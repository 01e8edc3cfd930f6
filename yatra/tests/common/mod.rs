#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use serde_json::json;

use yatra::embeddings::TextEmbedder;
use yatra::error::{Result, YatraError};
use yatra::knowledge::StaticContentStore;
use yatra::llm::TextGenerator;
use yatra::models::{GenerationRequest, GenerationResult, KnowledgeRecord, KnowledgeType};

static INIT: Once = Once::new();

pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("yatra=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Words that each own one embedding axis.
pub const AXES: [&str; 6] = ["kedarnath", "varanasi", "trek", "biryani", "diwali", "yoga"];

/// One axis per keyword present, plus a small constant so no vector is zero.
pub fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut v: Vec<f32> = AXES
        .iter()
        .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
        .collect();
    v.push(0.01);
    v
}

pub struct KeywordEmbedder;

#[async_trait]
impl TextEmbedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(keyword_vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }
}

/// Records every request; answers with a fixed reply or fails.
#[derive(Default)]
pub struct ScriptedGenerator {
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub fail: bool,
}

impl ScriptedGenerator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn last_request(&self) -> GenerationRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("generator was called")
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(YatraError::Llm("provider returned 502".to_string()));
        }
        Ok(GenerationResult {
            answer: "The temple opens in late April or early May.".to_string(),
            model: "scripted".to_string(),
            usage: None,
        })
    }
}

pub fn record(kind: KnowledgeType, value: serde_json::Value) -> KnowledgeRecord {
    KnowledgeRecord::from_value(kind, value).expect("valid fixture record")
}

pub fn kedarnath() -> KnowledgeRecord {
    record(
        KnowledgeType::SpiritualSite,
        json!({
            "id": "ss001",
            "name": "Kedarnath Temple",
            "state": "Uttarakhand",
            "category": "jyotirlinga",
            "quick_version": "Himalayan shrine of Shiva, open from spring to autumn.",
            "best_season": ["May", "June", "September", "October"]
        }),
    )
}

/// A small catalog spread over several categories.
pub fn catalog() -> StaticContentStore {
    StaticContentStore::new()
        .with(
            KnowledgeType::SpiritualSite,
            vec![
                kedarnath(),
                record(
                    KnowledgeType::SpiritualSite,
                    json!({"id": "ss002", "name": "Kashi Vishwanath, Varanasi", "state": "Uttar Pradesh", "category": "jyotirlinga"}),
                ),
            ],
        )
        .with(
            KnowledgeType::Trek,
            vec![record(
                KnowledgeType::Trek,
                json!({"id": "t001", "name": "Kedarkantha Trek", "state": "Uttarakhand", "difficulty": "easy"}),
            )],
        )
        .with(
            KnowledgeType::Cuisine,
            vec![record(
                KnowledgeType::Cuisine,
                json!({"id": "c001", "dish_name": "Hyderabadi Biryani", "state": "Telangana"}),
            )],
        )
        .with(
            KnowledgeType::Festival,
            vec![record(
                KnowledgeType::Festival,
                json!({"id": "f001", "name": "Diwali", "states_celebrated": ["All India"]}),
            )],
        )
}

pub fn arc<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
