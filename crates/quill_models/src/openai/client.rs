use super::dto::{ChatCompletionRequest, ChatCompletionResponse, ResponseFormat};
use crate::http::{build_client, decode_error, rejection, send_error, trim_base};
use crate::ProviderConfig;
use async_trait::async_trait;
use quill_core::{
    estimate_tokens, GenerateParams, GenerationResult, Message, ProviderCapabilities,
};
use quill_error::{ProviderError, ProviderErrorKind, ProviderResult};
use quill_interface::Provider;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for OpenAI-compatible chat completion APIs.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// Creates a new provider.
    ///
    /// `base_url` may be given with or without the `/v1` suffix.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let base = trim_base(&base_url.into());
        let api_base = if base.ends_with("/v1") {
            base
        } else {
            format!("{base}/v1")
        };
        let model = model.into();
        debug!(%api_base, %model, "Creating OpenAI-compatible provider");
        Ok(Self {
            client: build_client(PROVIDER, timeout)?,
            api_base,
            api_key: api_key.into(),
            model,
        })
    }

    /// Creates a provider from configuration.
    ///
    /// # Errors
    ///
    /// Fails when no API key is configured inline or in the environment.
    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        let api_key = config.resolve_api_key(DEFAULT_API_KEY_ENV).ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::InvalidConfiguration(format!(
                "openai provider requires an API key (set {})",
                config.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
            )))
        })?;
        let model = if config.model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            config.model.clone()
        };
        Self::new(
            config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            api_key,
            model,
            config
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        )
    }

    fn context_length(&self) -> u32 {
        let model = self.model.as_str();
        if model.starts_with("gpt-4o")
            || model.starts_with("gpt-4-turbo")
            || model.starts_with("gpt-4.1")
        {
            128_000
        } else if model.starts_with("gpt-4") {
            8_192
        } else {
            16_385
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    #[instrument(skip(self, messages, params), fields(model = %self.model))]
    async fn generate(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> ProviderResult<GenerationResult> {
        let start = Instant::now();
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            response_format: params.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(rejection(PROVIDER, response).await);
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| decode_error(PROVIDER, e))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::generation_failed(PROVIDER, "response has no choices"))?;

        let (prompt_tokens, completion_tokens) = match body.usage {
            Some(usage) => (usage.prompt_tokens, usage.completion_tokens),
            None => (
                messages.iter().map(|m| estimate_tokens(&m.content)).sum(),
                estimate_tokens(&text),
            ),
        };

        debug!(prompt_tokens, completion_tokens, "Received chat completion");
        Ok(GenerationResult {
            text,
            prompt_tokens,
            completion_tokens,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new(self.context_length())
            .with_tool_use(true)
            .with_json_mode(true)
            .with_streaming(true)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> ProviderResult<()> {
        let response = self
            .client
            .get(format!("{}/models", self.api_base))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                ProviderError::new(ProviderErrorKind::HealthCheckFailed {
                    provider: PROVIDER.to_string(),
                    message: e.to_string(),
                })
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::new(ProviderErrorKind::HealthCheckFailed {
                provider: PROVIDER.to_string(),
                message: format!("server returned {}", response.status()),
            }))
        }
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
