use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
    Client,
};

use crate::{
    config::{default_base_url, parse_llm_provider_model, LlmConfig},
    embeddings::{retry_with_backoff, RetryPolicy},
    error::{Result, YatraError},
    models::{ChatMessage, GenerationRequest, GenerationResult, Role, TokenUsage},
};

const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
struct ApiConfig {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
    retry: RetryPolicy,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    config: ApiConfig,
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_config = ApiConfig::from_llm_config(config);

        let (provider, _) = parse_llm_provider_model(&config.model);
        let needs_api_key = !matches!(
            provider.to_lowercase().as_str(),
            "ollama" | "local" | "lmstudio"
        );

        if needs_api_key && api_config.api_key.is_none() {
            return Err(YatraError::Llm(
                "API key required for this provider".to_string(),
            ));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_base(api_config.base_url.clone())
            .with_api_key(api_config.api_key.clone().unwrap_or_default());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api_config.timeout_secs))
            .build()
            .map_err(|error| {
                YatraError::Llm(format!("Failed to create LLM HTTP client: {error}"))
            })?;

        // A zero budget turns off async-openai's own 5xx and 429 retries.
        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self {
            client,
            config: api_config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send system prompt, history and the user query as one chat completion.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        if request.user_query.trim().is_empty() {
            return Err(YatraError::Validation("Query cannot be empty".to_string()));
        }

        let completion = self.build_request(request)?;
        let client = &self.client;
        let completion = &completion;

        let response = retry_with_backoff(
            &self.config.retry,
            move |_| {
                let completion = completion.clone();
                async move { client.chat().create(completion).await }
            },
            |error: &OpenAIError| {
                Self::rate_limit_error(error).is_none()
                    && Self::auth_error(error).is_none()
                    && Self::is_retryable(error)
            },
        )
        .await
        .map_err(|error| {
            Self::rate_limit_error(&error)
                .or_else(|| Self::auth_error(&error))
                .unwrap_or_else(|| Self::map_openai_error(error))
        })?;

        let result = Self::extract_result(response)?;
        tracing::debug!(
            model = %result.model,
            answer_len = result.answer.len(),
            total_tokens = result.usage.map(|u| u.total_tokens),
            "Generation completed"
        );
        Ok(result)
    }

    fn build_request(&self, request: &GenerationRequest) -> Result<CreateChatCompletionRequest> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(request.history.len() + 2);

        if !request.system_prompt.trim().is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system_prompt.as_str())
                    .build()
                    .map_err(|error| {
                        YatraError::Validation(format!("Invalid system prompt: {error}"))
                    })?
                    .into(),
            );
        }

        for turn in &request.history {
            messages.push(Self::history_message(turn)?);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user_query.as_str())
                .build()
                .map_err(|error| YatraError::Validation(format!("Invalid user prompt: {error}")))?
                .into(),
        );

        CreateChatCompletionRequestArgs::default()
            .model(self.config.model.clone())
            .messages(messages)
            .temperature(self.config.temperature)
            .top_p(self.config.top_p)
            .max_tokens(self.config.max_tokens)
            .build()
            .map_err(|error| {
                YatraError::Validation(format!("Invalid LLM completion request: {error}"))
            })
    }

    fn history_message(turn: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let invalid = |error: OpenAIError| {
            YatraError::Validation(format!("Invalid history message: {error}"))
        };

        Ok(match turn.role {
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(turn.content.as_str())
                .build()
                .map_err(invalid)?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(turn.content.as_str())
                .build()
                .map_err(invalid)?
                .into(),
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(turn.content.as_str())
                .build()
                .map_err(invalid)?
                .into(),
        })
    }

    fn extract_result(response: CreateChatCompletionResponse) -> Result<GenerationResult> {
        let usage = response.usage.map(|usage| TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        });

        let answer = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| YatraError::Llm("LLM response contained no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(YatraError::Llm(
                "LLM response contained empty content".to_string(),
            ));
        }

        Ok(GenerationResult {
            answer,
            model: response.model,
            usage,
        })
    }

    fn is_retryable(error: &OpenAIError) -> bool {
        match error {
            OpenAIError::ApiError(api_error) => {
                api_error.r#type.is_none() && api_error.code.is_none()
            }
            OpenAIError::Reqwest(reqwest_error) => reqwest_error
                .status()
                .map(|status| status.is_server_error())
                .unwrap_or(true),
            _ => false,
        }
    }

    fn rate_limit_error(error: &OpenAIError) -> Option<YatraError> {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) =>
            {
                Some(YatraError::LlmRateLimit { retry_after: None })
            }
            OpenAIError::ApiError(api_error) if Self::is_rate_limit_api_error(api_error) => {
                Some(YatraError::LlmRateLimit { retry_after: None })
            }
            _ => None,
        }
    }

    fn auth_error(error: &OpenAIError) -> Option<YatraError> {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::UNAUTHORIZED)
                    || reqwest_error.status() == Some(reqwest::StatusCode::FORBIDDEN) =>
            {
                Some(YatraError::ApiAuth(format!(
                    "LLM authentication failed: {reqwest_error}"
                )))
            }
            OpenAIError::ApiError(api_error) if Self::is_auth_api_error(api_error) => Some(
                YatraError::ApiAuth(format!("LLM authentication failed: {api_error}")),
            ),
            _ => None,
        }
    }

    fn is_rate_limit_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("rate limit")
            || message.contains("too many requests")
            || error_type.contains("rate_limit")
            || code.contains("rate_limit")
            || code == "insufficient_quota"
    }

    fn is_auth_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("unauthorized")
            || message.contains("invalid api key")
            || message.contains("authentication")
            || code.contains("invalid_api_key")
            || error_type.contains("authentication")
    }

    fn map_openai_error(error: OpenAIError) -> YatraError {
        match error {
            OpenAIError::Reqwest(reqwest_error) => {
                YatraError::Llm(format!("LLM request failed: {reqwest_error}"))
            }
            OpenAIError::ApiError(api_error) => {
                YatraError::Llm(format!("LLM API error: {api_error}"))
            }
            OpenAIError::JSONDeserialize(err) => {
                YatraError::Llm(format!("Failed to parse LLM response: {err}"))
            }
            OpenAIError::InvalidArgument(message) => YatraError::Validation(message),
            other => YatraError::Llm(other.to_string()),
        }
    }
}

impl ApiConfig {
    fn from_llm_config(config: &LlmConfig) -> Self {
        let (provider, model) = parse_llm_provider_model(&config.model);

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());

        let normalized_model = if provider.eq_ignore_ascii_case("local") {
            config.model.clone()
        } else {
            model.to_string()
        };

        Self {
            base_url,
            api_key: config.api_key.clone(),
            model: normalized_model,
            timeout_secs: config.timeout_secs,
            retry: RetryPolicy::new(config.max_retries, RETRY_BASE_DELAY),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        }
    }
}
