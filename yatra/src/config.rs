use serde::Deserialize;
use std::env;
use std::path::PathBuf;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub content: ContentConfig,
    pub embeddings: EmbeddingsConfig,
    pub vector: VectorConfig,
    pub llm: Option<LlmConfig>,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

/// Location of the static knowledge catalog and persona defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    pub data_dir: PathBuf,
    pub default_persona_id: String,
}

pub const DEFAULT_MOCK_DIMENSIONS: usize = 1536;

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Expected vector length. Provider responses are checked against it when
    /// set; mock vectors use it or [`DEFAULT_MOCK_DIMENSIONS`].
    pub dimensions: Option<usize>,
    pub batch_size: usize,
    pub max_retries: u32,
    pub initial_retry_delay_ms: u64,
    pub timeout_secs: u64,
    /// Deterministic offline vectors instead of provider calls. Dev/test only.
    pub mock: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackendKind {
    Chroma,
    Memory,
}

impl std::str::FromStr for VectorBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chroma" => Ok(Self::Chroma),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(format!("Unknown vector backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorConfig {
    pub backend: VectorBackendKind,
    pub url: String,
    pub collection: String,
    pub tenant: String,
    pub database: String,
    pub timeout_secs: u64,
}

/// LLM configuration for the answer generation step
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    /// Generation is fail-fast unless this is raised above zero.
    pub max_retries: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub top_k: usize,
    pub history_window: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            model: "openrouter/cohere/embed-multilingual-v3.0".to_string(),
            api_key: None,
            base_url: None,
            dimensions: None,
            batch_size: 8,
            max_retries: 5,
            initial_retry_delay_ms: 1000,
            timeout_secs: 30,
            mock: false,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            history_window: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let embedding_defaults = EmbeddingsConfig::default();
        let chat_defaults = ChatConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("YATRA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("YATRA_PORT", 5000),
                api_keys: env::var("YATRA_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            content: ContentConfig {
                data_dir: env::var("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./data")),
                default_persona_id: env::var("DEFAULT_PERSONA_ID")
                    .unwrap_or_else(|_| "pers001".to_string()),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDING_MODEL").unwrap_or(embedding_defaults.model),
                api_key: env::var("EMBEDDING_API_KEY")
                    .or_else(|_| env::var("OPENROUTER_API_KEY"))
                    .ok(),
                base_url: env::var("EMBEDDING_BASE_URL").ok(),
                dimensions: parse_env_opt("EMBEDDING_DIMENSIONS").or(embedding_defaults.dimensions),
                batch_size: parse_env_or("EMBEDDING_BATCH_SIZE", embedding_defaults.batch_size),
                max_retries: parse_env_or("EMBEDDING_MAX_RETRIES", embedding_defaults.max_retries),
                initial_retry_delay_ms: parse_env_or(
                    "EMBEDDING_RETRY_DELAY_MS",
                    embedding_defaults.initial_retry_delay_ms,
                ),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", embedding_defaults.timeout_secs),
                mock: parse_env_or("MOCK_EMBEDDINGS", false),
            },
            vector: VectorConfig {
                backend: parse_env_or("VECTOR_BACKEND", VectorBackendKind::Chroma),
                url: env::var("CHROMA_URL").unwrap_or_else(|_| "http://localhost:8000".to_string()),
                collection: env::var("CHROMA_COLLECTION")
                    .unwrap_or_else(|_| "india_travel_knowledge".to_string()),
                tenant: env::var("CHROMA_TENANT").unwrap_or_else(|_| "default_tenant".to_string()),
                database: env::var("CHROMA_DATABASE")
                    .unwrap_or_else(|_| "default_database".to_string()),
                timeout_secs: parse_env_or("VECTOR_TIMEOUT", 30),
            },
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 60),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 0),
                temperature: parse_env_or("LLM_TEMPERATURE", 0.7),
                top_p: parse_env_or("LLM_TOP_P", 0.9),
                max_tokens: parse_env_or("LLM_MAX_TOKENS", 1500),
            }),
            chat: ChatConfig {
                top_k: parse_env_opt("CHAT_TOP_K")
                    .filter(|k: &usize| *k > 0)
                    .unwrap_or(chat_defaults.top_k),
                history_window: parse_env_opt("CHAT_HISTORY_WINDOW")
                    .map(|w: usize| w.min(chat_defaults.history_window))
                    .unwrap_or(chat_defaults.history_window),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known embedding providers that use OpenAI-compatible APIs
const KNOWN_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse a model name into (provider, model) tuple.
///
/// `openrouter/cohere/embed-multilingual-v3.0` splits on the first slash only,
/// so the provider-side model keeps its own vendor prefix.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("openai", model)
}

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}

/// Provider-specific default base URLs
pub fn default_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "lmstudio" => "http://localhost:1234/v1",
        _ => "https://api.openai.com/v1",
    }
}
